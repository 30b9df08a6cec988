use crate::core::types::UrlId;
use serde::Serialize;

/// One body keyword of a returned document, with its in-document frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub word: String,
    pub frequency: u32,
}

/// A ranked, hydrated search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub url_id: UrlId,
    pub score: f64,
    pub title: String,
    pub url: String,
    pub last_modified: String,
    pub size: String,
    pub keywords: Vec<Keyword>,
    pub parent_links: Vec<String>,
    pub child_links: Vec<String>,
}
