use crate::model::{Article, ArticleRedirect};
use crate::slug::{shorten_id, urlify};

/// `article/<short id>/<slug>.html`
pub fn canonical_url(article: &Article) -> String {
    format!(
        "article/{}/{}.html",
        shorten_id(article.id),
        urlify(&article.title)
    )
}

/// Redirects for one article: P1 before P2, skipping empty or canonical links.
pub fn redirects_for(article: &Article) -> Vec<ArticleRedirect> {
    let canonical = canonical_url(article);
    [&article.permalink1, &article.permalink2]
        .into_iter()
        .filter(|permalink| !permalink.is_empty() && **permalink != canonical)
        .map(|permalink| ArticleRedirect {
            url: permalink.clone(),
            article_id: article.id,
        })
        .collect()
}

pub fn extract_redirects(articles: &[Article]) -> Vec<ArticleRedirect> {
    let redirects: Vec<ArticleRedirect> = articles.iter().flat_map(redirects_for).collect();
    tracing::info!(
        articles = articles.len(),
        redirects = redirects.len(),
        "derived article redirects"
    );
    redirects
}
