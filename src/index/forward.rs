use crate::core::types::{UrlId, WordId};
use std::collections::HashMap;

/// Forward index: urlId -> word ids occurring in the document. Entries keep
/// first-seen order in memory; the persisted encoding sorts them.
#[derive(Debug, Default)]
pub struct ForwardIndex {
    entries: HashMap<UrlId, Vec<WordId>>,
}

impl ForwardIndex {
    pub fn new() -> Self {
        ForwardIndex::default()
    }

    /// Updates the entry for `url`. With `remove_old` the entry is reset to
    /// the distinct ids in `words`; otherwise the ids are unioned into the
    /// existing entry. An empty word sequence is a no-op.
    pub fn update(&mut self, url: &UrlId, words: &[WordId], remove_old: bool) {
        if words.is_empty() {
            return;
        }

        let mut ids = if remove_old {
            Vec::new()
        } else {
            self.entries.remove(url).unwrap_or_default()
        };

        for word in words {
            if !ids.contains(word) {
                ids.push(word.clone());
            }
        }

        self.entries.insert(url.clone(), ids);
    }

    pub fn words_of(&self, url: &UrlId) -> &[WordId] {
        self.entries.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, url: &UrlId, word: &WordId) -> bool {
        self.words_of(url).contains(word)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&UrlId, &Vec<WordId>)> {
        self.entries.iter()
    }

    /// Restores one entry from a persisted snapshot.
    pub fn insert_raw(&mut self, url: UrlId, words: Vec<WordId>) {
        self.entries.insert(url, words);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
