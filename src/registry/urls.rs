use crate::core::types::{PageMeta, UrlId};
use std::collections::HashMap;
use uuid::Uuid;

/// Monotonic bijection between urls and opaque url ids, plus the link graph
/// and per-page metadata. Adjacency lists keep first-seen order and never
/// hold a url id twice.
#[derive(Debug, Default)]
pub struct UrlRegistry {
    url_to_id: HashMap<String, UrlId>,
    id_to_url: HashMap<UrlId, String>,
    children: HashMap<UrlId, Vec<UrlId>>,
    parents: HashMap<UrlId, Vec<UrlId>>,
    meta: HashMap<UrlId, PageMeta>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        UrlRegistry::default()
    }

    pub fn get_or_create(&mut self, url: &str) -> UrlId {
        if let Some(id) = self.url_to_id.get(url) {
            return id.clone();
        }
        let id = UrlId::new(Uuid::new_v4().as_u128().to_string());
        self.url_to_id.insert(url.to_string(), id.clone());
        self.id_to_url.insert(id.clone(), url.to_string());
        id
    }

    pub fn id_of(&self, url: &str) -> Option<&UrlId> {
        self.url_to_id.get(url)
    }

    pub fn url_of(&self, id: &UrlId) -> Option<&str> {
        self.id_to_url.get(id).map(String::as_str)
    }

    /// Records `parent -> child` in both adjacency directions.
    pub fn record_link(&mut self, parent: &UrlId, child: &UrlId) {
        let children = self.children.entry(parent.clone()).or_default();
        if !children.contains(child) {
            children.push(child.clone());
        }
        let parents = self.parents.entry(child.clone()).or_default();
        if !parents.contains(parent) {
            parents.push(parent.clone());
        }
    }

    pub fn children_of(&self, id: &UrlId) -> &[UrlId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn parents_of(&self, id: &UrlId) -> &[UrlId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn set_page_meta(&mut self, id: &UrlId, meta: PageMeta) {
        self.meta.insert(id.clone(), meta);
    }

    pub fn meta_of(&self, id: &UrlId) -> Option<&PageMeta> {
        self.meta.get(id)
    }

    /// Restores a (url, id) pair from a persisted snapshot.
    pub fn insert(&mut self, url: String, id: UrlId) {
        self.url_to_id.insert(url.clone(), id.clone());
        self.id_to_url.insert(id, url);
    }

    pub fn set_children(&mut self, id: UrlId, children: Vec<UrlId>) {
        self.children.insert(id, children);
    }

    pub fn set_parents(&mut self, id: UrlId, parents: Vec<UrlId>) {
        self.parents.insert(id, parents);
    }

    pub fn urls(&self) -> impl Iterator<Item = (&String, &UrlId)> {
        self.url_to_id.iter()
    }

    pub fn adjacency_children(&self) -> impl Iterator<Item = (&UrlId, &Vec<UrlId>)> {
        self.children.iter()
    }

    pub fn adjacency_parents(&self) -> impl Iterator<Item = (&UrlId, &Vec<UrlId>)> {
        self.parents.iter()
    }

    pub fn metas(&self) -> impl Iterator<Item = (&UrlId, &PageMeta)> {
        self.meta.iter()
    }

    pub fn len(&self) -> usize {
        self.url_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.url_to_id.is_empty()
    }
}
