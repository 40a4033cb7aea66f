use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::content_hash::{BlobName, ContentHash};

/// The three record kinds found in the legacy dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Text,
    Article,
    Crash,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Article => write!(f, "article"),
            Self::Crash => write!(f, "crash"),
        }
    }
}

/// Markup format of a text revision. Discriminants are the wire values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    #[default]
    Html = 0,
    Textile = 1,
    Markdown = 2,
    PlainText = 3,
}

impl TextFormat {
    /// Parse the legacy `F:` value.
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value {
            "html" => Some(Self::Html),
            "textile" => Some(Self::Textile),
            "markdown" => Some(Self::Markdown),
            "text" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Textile => write!(f, "textile"),
            Self::Markdown => write!(f, "markdown"),
            Self::PlainText => write!(f, "text"),
        }
    }
}

/// One text revision. Its content lives in the blob tree under `hash`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub id: u64,
    pub created_on: DateTime<Utc>,
    pub format: TextFormat,
    pub hash: ContentHash,
    /// `M:` exactly as written when it is not canonical lowercase hex. Legacy
    /// blob files are named with this spelling.
    #[serde(skip)]
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: u64,
    pub published_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub permalink1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub permalink2: String,
    pub is_private: bool,
    pub is_deleted: bool,
    pub title: String,
    pub tags: Vec<String>,
    /// Text revision history, oldest first.
    pub version_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crash {
    pub created_on: DateTime<Utc>,
    pub program_name: String,
    pub program_version: String,
    pub ip_addr: String,
    pub ip_addr_compact: String,
    /// Replaced when the header-prefixed dump is relocated.
    pub hash: ContentHash,
    /// Non-canonical spelling of `M:`, naming the source dump until relocation.
    #[serde(skip)]
    pub source_name: Option<String>,
    /// Empty until the blob has been relocated.
    pub crashed_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRedirect {
    pub url: String,
    pub article_id: u64,
}

fn name_or_hex<'a>(source_name: &'a Option<String>, hash: &ContentHash) -> Cow<'a, str> {
    match source_name {
        Some(name) => Cow::Borrowed(name.as_str()),
        None => Cow::Owned(hash.to_hex()),
    }
}

impl BlobName for Text {
    fn blob_name(&self) -> Cow<'_, str> {
        name_or_hex(&self.source_name, &self.hash)
    }
}

impl BlobName for Crash {
    fn blob_name(&self) -> Cow<'_, str> {
        name_or_hex(&self.source_name, &self.hash)
    }
}

/// Zero value used for records whose `On:` key is absent.
pub(crate) fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Default for Text {
    fn default() -> Self {
        Self {
            id: 0,
            created_on: unix_epoch(),
            format: TextFormat::default(),
            hash: ContentHash::default(),
            source_name: None,
        }
    }
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: 0,
            published_on: unix_epoch(),
            permalink1: String::new(),
            permalink2: String::new(),
            is_private: false,
            is_deleted: false,
            title: String::new(),
            tags: Vec::new(),
            version_ids: Vec::new(),
        }
    }
}

impl Default for Crash {
    fn default() -> Self {
        Self {
            created_on: unix_epoch(),
            program_name: String::new(),
            program_version: String::new(),
            ip_addr: String::new(),
            ip_addr_compact: String::new(),
            hash: ContentHash::default(),
            source_name: None,
            crashed_line: String::new(),
        }
    }
}
