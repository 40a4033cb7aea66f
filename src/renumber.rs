use std::collections::HashMap;

use serde::Serialize;

use crate::error::{MigrateError, Result};
use crate::model::{Article, Text};

/// One old->new text id pair, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdMapEntry {
    pub old_id: u64,
    pub new_id: u64,
}

/// Build the dense old->new map: the i-th parsed text becomes id `i`.
///
/// A legacy id that appears more than once maps to its last occurrence.
pub fn build_dense_id_map(texts: &[Text]) -> HashMap<u64, u64> {
    let mut id_map = HashMap::with_capacity(texts.len());
    for (position, text) in texts.iter().enumerate() {
        if let Some(previous) = id_map.insert(text.id, position as u64) {
            tracing::warn!(
                text_id = text.id,
                previous,
                current = position,
                "duplicate text id; later revision wins"
            );
        }
    }
    id_map
}

fn remap_id(old_id: u64, id_map: &HashMap<u64, u64>, article_id: u64) -> Result<u64> {
    id_map.get(&old_id).copied().ok_or_else(|| {
        MigrateError::InvariantViolation(format!(
            "missing id mapping for text {old_id} referenced by article {article_id}"
        ))
    })
}

/// Renumber texts by parse order and rewrite every article's revision list.
///
/// Articles are validated in full before anything is mutated, so a failed
/// call leaves both slices untouched.
pub fn renumber_texts(texts: &mut [Text], articles: &mut [Article]) -> Result<Vec<IdMapEntry>> {
    let id_map = build_dense_id_map(texts);

    let rewritten = articles
        .iter()
        .map(|article| {
            article
                .version_ids
                .iter()
                .map(|&old_id| remap_id(old_id, &id_map, article.id))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut entries = Vec::with_capacity(texts.len());
    for (position, text) in texts.iter_mut().enumerate() {
        let new_id = position as u64;
        entries.push(IdMapEntry {
            old_id: text.id,
            new_id,
        });
        text.id = new_id;
    }
    for (article, version_ids) in articles.iter_mut().zip(rewritten) {
        article.version_ids = version_ids;
    }

    tracing::info!(texts = texts.len(), "renumbered text ids");
    Ok(entries)
}
