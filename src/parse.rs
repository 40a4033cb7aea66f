//! Parser for the legacy `Key: Value` record dumps.
//!
//! A dump is a sequence of blocks separated by a blank line. Each block is one
//! record; each line inside it is one field. Unknown keys and unparseable
//! values abort the whole parse. Absent keys leave the field at its zero value.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::content_hash::ContentHash;
use crate::error::{MigrateError, Result};
use crate::model::{Article, Crash, RecordKind, Text, TextFormat};

const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BLOCK_SEPARATOR: &[u8] = b"\n\n";

/// Split a dump into record blocks, in file order.
///
/// Empty blocks (runs of blank lines) are dropped. A final block that is not
/// followed by a blank line is still returned, minus its trailing newline.
pub fn split_records(mut data: &[u8]) -> Vec<&[u8]> {
    let mut blocks = Vec::new();
    while !data.is_empty() {
        let (block, rest) = match find(data, BLOCK_SEPARATOR) {
            Some(idx) => (&data[..idx], &data[idx + BLOCK_SEPARATOR.len()..]),
            None => (data, &data[data.len()..]),
        };
        let block = trim_newlines(block);
        if !block.is_empty() {
            blocks.push(block);
        }
        data = rest;
    }
    blocks
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_newlines(mut block: &[u8]) -> &[u8] {
    while let [b'\n', rest @ ..] = block {
        block = rest;
    }
    while let [rest @ .., b'\n'] = block {
        block = rest;
    }
    block
}

/// One `Key: Value` line of a block.
struct Field {
    key: String,
    value: String,
}

fn fields(kind: RecordKind, index: usize, block: &[u8]) -> Result<Vec<Field>> {
    block
        .split(|&b| b == b'\n')
        .map(|line| {
            let line = String::from_utf8_lossy(line);
            if let Some((key, value)) = line.split_once(": ") {
                return Ok(Field {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            // A value-less field may have lost its trailing space.
            if let Some(key) = line.strip_suffix(':') {
                return Ok(Field {
                    key: key.to_string(),
                    value: String::new(),
                });
            }
            Err(MigrateError::malformed(
                kind,
                index,
                format!("line '{line}' is not a 'Key: Value' pair"),
            ))
        })
        .collect()
}

/// Parse a legacy `YYYY-MM-DD HH:MM:SS` timestamp, interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, LEGACY_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Pack a dotted-quad IPv4 address into a lowercase hex u32.
///
/// Anything that is not exactly four decimal octets (IPv6, hostnames, junk)
/// is returned unchanged.
pub fn compact_ip(raw: &str) -> String {
    let octets: Vec<&str> = raw.split('.').collect();
    if octets.len() != 4 {
        return raw.to_string();
    }

    let mut packed = 0_u32;
    for octet in octets {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return raw.to_string();
        }
        let Ok(value) = octet.parse::<u8>() else {
            return raw.to_string();
        };
        packed = (packed << 8) | u32::from(value);
    }
    format!("{packed:x}")
}

struct RecordContext {
    kind: RecordKind,
    index: usize,
}

impl RecordContext {
    fn error(&self, reason: impl Into<String>) -> MigrateError {
        MigrateError::malformed(self.kind, self.index, reason)
    }

    fn id(&self, field: &Field) -> Result<u64> {
        field.value.parse::<u64>().map_err(|err| {
            self.error(format!(
                "invalid {} value '{}': {err}",
                field.key, field.value
            ))
        })
    }

    fn timestamp(&self, field: &Field) -> Result<DateTime<Utc>> {
        parse_timestamp(&field.value)
            .ok_or_else(|| self.error(format!("invalid date '{}'", field.value)))
    }

    /// The digest plus the raw spelling when it differs from lowercase hex.
    fn hash(&self, field: &Field) -> Result<(ContentHash, Option<String>)> {
        let hash = field
            .value
            .parse::<ContentHash>()
            .map_err(|err| self.error(format!("invalid M value '{}': {err}", field.value)))?;
        let source_name = (field.value != hash.to_hex()).then(|| field.value.clone());
        Ok((hash, source_name))
    }

    fn unknown(&self, field: &Field) -> MigrateError {
        self.error(format!("unknown field '{}'", field.key))
    }
}

fn parse_text(ctx: &RecordContext, block: &[u8]) -> Result<Text> {
    let mut text = Text::default();
    for field in fields(ctx.kind, ctx.index, block)? {
        match field.key.as_str() {
            "I" => text.id = ctx.id(&field)?,
            "M" => (text.hash, text.source_name) = ctx.hash(&field)?,
            "On" => text.created_on = ctx.timestamp(&field)?,
            "F" => {
                text.format = TextFormat::from_legacy(&field.value)
                    .ok_or_else(|| ctx.error(format!("unknown F value '{}'", field.value)))?;
            }
            _ => return Err(ctx.unknown(&field)),
        }
    }
    Ok(text)
}

fn permalink(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed == "None" {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn parse_article(ctx: &RecordContext, block: &[u8]) -> Result<Article> {
    let mut article = Article::default();
    for field in fields(ctx.kind, ctx.index, block)? {
        match field.key.as_str() {
            "I" => article.id = ctx.id(&field)?,
            "On" => article.published_on = ctx.timestamp(&field)?,
            "IS" => {}
            "P1" => article.permalink1 = permalink(&field.value),
            "P2" => article.permalink2 = permalink(&field.value),
            // The legacy flag records "is public"; only a literal False marks a private article.
            "P?" => article.is_private = field.value == "False",
            "D?" => article.is_deleted = field.value == "True",
            "T" => article.title = field.value.trim().to_string(),
            "TG" => article.tags = field.value.split(',').map(str::to_string).collect(),
            "V" => {
                article.version_ids = field
                    .value
                    .split(',')
                    .map(|token| {
                        token.parse::<u64>().map_err(|err| {
                            ctx.error(format!("invalid V entry '{token}': {err}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            _ => return Err(ctx.unknown(&field)),
        }
    }
    Ok(article)
}

fn parse_crash(ctx: &RecordContext, block: &[u8]) -> Result<Crash> {
    let mut crash = Crash::default();
    for field in fields(ctx.kind, ctx.index, block)? {
        match field.key.as_str() {
            "M" => (crash.hash, crash.source_name) = ctx.hash(&field)?,
            "On" => crash.created_on = ctx.timestamp(&field)?,
            "Ip" => {
                crash.ip_addr_compact = compact_ip(&field.value);
                crash.ip_addr = field.value;
            }
            "N" => crash.program_name = field.value,
            "V" => crash.program_version = field.value,
            _ => return Err(ctx.unknown(&field)),
        }
    }
    Ok(crash)
}

fn parse_all<T>(
    kind: RecordKind,
    data: &[u8],
    parse_one: fn(&RecordContext, &[u8]) -> Result<T>,
) -> Result<Vec<T>> {
    if !data.is_empty() && !data.ends_with(BLOCK_SEPARATOR) {
        tracing::warn!(%kind, "dump does not end with a blank line; parsing last record anyway");
    }
    let records = split_records(data)
        .into_iter()
        .enumerate()
        .map(|(index, block)| parse_one(&RecordContext { kind, index }, block))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(%kind, count = records.len(), "parsed records");
    Ok(records)
}

pub fn parse_texts(data: &[u8]) -> Result<Vec<Text>> {
    parse_all(RecordKind::Text, data, parse_text)
}

pub fn parse_articles(data: &[u8]) -> Result<Vec<Article>> {
    parse_all(RecordKind::Article, data, parse_article)
}

pub fn parse_crashes(data: &[u8]) -> Result<Vec<Crash>> {
    parse_all(RecordKind::Crash, data, parse_crash)
}
