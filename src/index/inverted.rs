use crate::core::types::{UrlId, WordId};
use crate::index::posting::Posting;
use std::collections::HashMap;

/// Positional inverted index: wordId -> urlId -> posting. Also tracks which
/// words each document currently posts under, so re-indexing a document
/// replaces its postings wholesale instead of leaving stale words behind.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<WordId, HashMap<UrlId, Posting>>,
    doc_words: HashMap<UrlId, Vec<WordId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex::default()
    }

    /// Indexes one document: positions are 0-based offsets into `words`.
    /// An empty word sequence is a no-op. Any previous postings for the
    /// document are dropped first.
    pub fn index_document(&mut self, url: &UrlId, words: &[WordId]) {
        if words.is_empty() {
            return;
        }

        self.remove_document(url);

        let mut positions: HashMap<&WordId, Vec<u32>> = HashMap::new();
        for (i, word) in words.iter().enumerate() {
            positions.entry(word).or_default().push(i as u32);
        }

        let mut posted = Vec::with_capacity(positions.len());
        for (word, positions) in positions {
            self.postings
                .entry(word.clone())
                .or_default()
                .insert(url.clone(), Posting::from_positions(positions));
            posted.push(word.clone());
        }
        self.doc_words.insert(url.clone(), posted);
    }

    fn remove_document(&mut self, url: &UrlId) {
        let Some(old_words) = self.doc_words.remove(url) else {
            return;
        };
        for word in old_words {
            if let Some(docs) = self.postings.get_mut(&word) {
                docs.remove(url);
                if docs.is_empty() {
                    self.postings.remove(&word);
                }
            }
        }
    }

    pub fn postings_for(&self, word: &WordId) -> Option<&HashMap<UrlId, Posting>> {
        self.postings.get(word)
    }

    pub fn posting(&self, word: &WordId, url: &UrlId) -> Option<&Posting> {
        self.postings.get(word).and_then(|docs| docs.get(url))
    }

    /// Number of documents with at least one posting.
    pub fn doc_count(&self) -> usize {
        self.doc_words.len()
    }

    pub fn words(&self) -> impl Iterator<Item = (&WordId, &HashMap<UrlId, Posting>)> {
        self.postings.iter()
    }

    pub fn contains_doc(&self, url: &UrlId) -> bool {
        self.doc_words.contains_key(url)
    }

    /// Restores one posting row from a persisted snapshot.
    pub fn insert_raw(&mut self, word: WordId, url: UrlId, posting: Posting) {
        self.doc_words.entry(url.clone()).or_default().push(word.clone());
        self.postings.entry(word).or_default().insert(url, posting);
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wid(s: &str) -> WordId {
        WordId::new(s)
    }

    fn uid(s: &str) -> UrlId {
        UrlId::new(s)
    }

    #[test]
    fn duplicate_words_accumulate_positions() {
        let mut index = InvertedIndex::new();
        let doc = uid("d1");
        index.index_document(&doc, &[wid("a"), wid("b"), wid("a")]);

        let posting = index.posting(&wid("a"), &doc).unwrap();
        assert_eq!(posting.frequency, 2);
        assert_eq!(posting.positions, vec![0, 2]);
        assert!(posting.is_consistent());
    }

    #[test]
    fn reindexing_replaces_postings_wholesale() {
        let mut index = InvertedIndex::new();
        let doc = uid("d1");
        index.index_document(&doc, &[wid("a"), wid("a"), wid("b")]);
        index.index_document(&doc, &[wid("c")]);

        assert!(index.posting(&wid("a"), &doc).is_none());
        assert!(index.posting(&wid("b"), &doc).is_none());
        assert_eq!(index.posting(&wid("c"), &doc).unwrap().positions, vec![0]);
    }

    #[test]
    fn reindexing_is_idempotent() {
        let mut once = InvertedIndex::new();
        let mut twice = InvertedIndex::new();
        let doc = uid("d1");
        let words = [wid("x"), wid("y"), wid("x")];

        once.index_document(&doc, &words);
        twice.index_document(&doc, &words);
        twice.index_document(&doc, &words);

        assert_eq!(
            once.posting(&wid("x"), &doc),
            twice.posting(&wid("x"), &doc)
        );
        assert_eq!(once.doc_count(), twice.doc_count());
    }

    #[test]
    fn empty_word_sequence_is_a_noop() {
        let mut index = InvertedIndex::new();
        index.index_document(&uid("d1"), &[]);
        assert!(index.is_empty());
        assert_eq!(index.doc_count(), 0);
    }

    #[test]
    fn doc_count_tracks_distinct_documents() {
        let mut index = InvertedIndex::new();
        index.index_document(&uid("d1"), &[wid("a")]);
        index.index_document(&uid("d2"), &[wid("a"), wid("b")]);
        index.index_document(&uid("d1"), &[wid("b")]);
        assert_eq!(index.doc_count(), 2);
    }
}
