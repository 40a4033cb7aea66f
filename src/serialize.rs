//! Compact `|`-separated line format.
//!
//! Every record renders to exactly one `\n`-terminated line. Separator
//! characters are stripped from free-text fields rather than escaped.

use crate::model::{Article, ArticleRedirect, Crash, Text};

fn strip_field_separator(value: &str) -> String {
    value.replace('|', "")
}

fn strip_list_separator(value: &str) -> String {
    value.replace(',', "")
}

/// Booleans are `1` or empty to save space.
fn flag(value: bool) -> &'static str {
    if value { "1" } else { "" }
}

fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| strip_list_separator(tag))
        .collect::<Vec<_>>()
        .join(",")
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn text_line(text: &Text) -> String {
    format!(
        "T{}|{}|{}|{}\n",
        text.id,
        text.created_on.timestamp(),
        text.format.as_wire(),
        text.hash.to_base64()
    )
}

pub fn article_line(article: &Article) -> String {
    format!(
        "A{}|{}|{}|{}|{}|{}|{}\n",
        article.id,
        article.published_on.timestamp(),
        strip_field_separator(&article.title),
        flag(article.is_private),
        flag(article.is_deleted),
        join_tags(&article.tags),
        join_ids(&article.version_ids)
    )
}

pub fn crash_line(crash: &Crash) -> String {
    format!(
        "C{}|{}|{}|{}|{}|{}\n",
        crash.hash.to_base64(),
        crash.created_on.timestamp(),
        strip_field_separator(&crash.program_name),
        strip_field_separator(&crash.program_version),
        crash.ip_addr_compact,
        strip_field_separator(&crash.crashed_line)
    )
}

pub fn redirect_line(redirect: &ArticleRedirect) -> String {
    format!("{}|{}\n", redirect.article_id, redirect.url)
}

/// `blogdata.txt` body: all texts, then all articles.
pub fn blog_data(texts: &[Text], articles: &[Article]) -> String {
    texts
        .iter()
        .map(text_line)
        .chain(articles.iter().map(article_line))
        .collect()
}

pub fn crashes_data(crashes: &[Crash]) -> String {
    crashes.iter().map(crash_line).collect()
}

pub fn redirects_data(redirects: &[ArticleRedirect]) -> String {
    redirects.iter().map(redirect_line).collect()
}
