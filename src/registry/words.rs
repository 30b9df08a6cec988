use crate::core::types::WordId;
use std::collections::HashMap;
use uuid::Uuid;

/// Monotonic bijection between normalized words and opaque word ids.
#[derive(Debug, Default)]
pub struct WordDictionary {
    word_to_id: HashMap<String, WordId>,
    id_to_word: HashMap<WordId, String>,
}

impl WordDictionary {
    pub fn new() -> Self {
        WordDictionary::default()
    }

    /// Returns the existing id for `word`, minting a fresh one on first
    /// sighting. Ids are 128-bit random integers rendered as decimal.
    pub fn get_or_create(&mut self, word: &str) -> WordId {
        if let Some(id) = self.word_to_id.get(word) {
            return id.clone();
        }
        let id = WordId::new(Uuid::new_v4().as_u128().to_string());
        self.word_to_id.insert(word.to_string(), id.clone());
        self.id_to_word.insert(id.clone(), word.to_string());
        id
    }

    pub fn id_of(&self, word: &str) -> Option<&WordId> {
        self.word_to_id.get(word)
    }

    pub fn word_of(&self, id: &WordId) -> Option<&str> {
        self.id_to_word.get(id).map(String::as_str)
    }

    /// Restores a (word, id) pair from a persisted snapshot.
    pub fn insert(&mut self, word: String, id: WordId) {
        self.word_to_id.insert(word.clone(), id.clone());
        self.id_to_word.insert(id, word);
    }

    pub fn words(&self) -> impl Iterator<Item = (&String, &WordId)> {
        self.word_to_id.iter()
    }

    pub fn len(&self) -> usize {
        self.word_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_id.is_empty()
    }
}
