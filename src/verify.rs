use std::collections::HashSet;

use crate::error::{MigrateError, Result};
use crate::model::{Article, Text};

/// Check that every article revision points at a parsed text.
///
/// Must run before renumbering: afterwards the legacy ids are gone.
pub fn verify_versions(texts: &[Text], articles: &[Article]) -> Result<()> {
    let known: HashSet<u64> = texts.iter().map(|text| text.id).collect();

    for article in articles {
        if let Some(&text_id) = article.version_ids.iter().find(|id| !known.contains(id)) {
            return Err(MigrateError::IntegrityViolation {
                article_id: article.id,
                text_id,
            });
        }
    }

    tracing::info!(
        texts = texts.len(),
        articles = articles.len(),
        "article revisions verified"
    );
    Ok(())
}
