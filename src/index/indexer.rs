use crate::core::types::UrlId;
use crate::core::types::WordId;
use crate::index::forward::ForwardIndex;
use crate::index::inverted::InvertedIndex;
use crate::registry::words::WordDictionary;

/// Owns the word dictionary and the three in-memory indexes for the
/// lifetime of a crawl. Words arriving here are already normalized; no
/// further text transformation happens.
#[derive(Debug, Default)]
pub struct Indexer {
    pub dictionary: WordDictionary,
    pub body: InvertedIndex,
    pub title: InvertedIndex,
    pub forward: ForwardIndex,
}

impl Indexer {
    pub fn new() -> Self {
        Indexer::default()
    }

    /// Dictionary growth only: ensures every word has an id.
    pub fn add_words(&mut self, words: &[String]) {
        for word in words {
            self.dictionary.get_or_create(word);
        }
    }

    pub fn index_body(&mut self, words: &[String], url: &UrlId) {
        let ids = self.word_ids(words);
        self.body.index_document(url, &ids);
    }

    pub fn index_title(&mut self, words: &[String], url: &UrlId) {
        let ids = self.word_ids(words);
        self.title.index_document(url, &ids);
    }

    pub fn update_forward(&mut self, words: &[String], url: &UrlId, remove_old: bool) {
        let ids = self.word_ids(words);
        self.forward.update(url, &ids, remove_old);
    }

    /// Number of documents with at least one body posting.
    pub fn doc_count(&self) -> usize {
        self.body.doc_count()
    }

    fn word_ids(&mut self, words: &[String]) -> Vec<WordId> {
        words
            .iter()
            .map(|w| self.dictionary.get_or_create(w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(s: &str) -> UrlId {
        UrlId::new(s)
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn body_postings_go_through_the_dictionary() {
        let mut indexer = Indexer::new();
        let d = doc("d1");
        indexer.index_body(&words(&["fox", "story", "fox"]), &d);

        let fox = indexer.dictionary.id_of("fox").unwrap().clone();
        let posting = indexer.body.posting(&fox, &d).unwrap();
        assert_eq!(posting.frequency, 2);
        assert_eq!(posting.positions, vec![0, 2]);
    }

    #[test]
    fn forward_entry_covers_body_and_title_words() {
        let mut indexer = Indexer::new();
        let d = doc("d1");
        let body = words(&["quick", "fox"]);
        let title = words(&["fox", "story"]);

        indexer.add_words(&body);
        indexer.add_words(&title);
        indexer.index_body(&body, &d);
        indexer.index_title(&title, &d);
        indexer.update_forward(&body, &d, true);
        indexer.update_forward(&title, &d, false);

        for word in ["quick", "fox", "story"] {
            let id = indexer.dictionary.id_of(word).unwrap();
            assert!(indexer.forward.contains(&d, id), "missing {word}");
        }
    }

    #[test]
    fn every_posted_word_appears_in_forward() {
        let mut indexer = Indexer::new();
        let d = doc("d1");
        let body = words(&["one", "two", "one"]);
        indexer.index_body(&body, &d);
        indexer.update_forward(&body, &d, true);

        for (word_id, docs) in indexer.body.words() {
            if docs.contains_key(&d) {
                assert!(indexer.forward.contains(&d, word_id));
            }
        }
    }

    #[test]
    fn reindex_with_remove_old_drops_stale_words() {
        let mut indexer = Indexer::new();
        let d = doc("d1");
        indexer.index_body(&words(&["a", "a", "b"]), &d);
        indexer.update_forward(&words(&["a", "a", "b"]), &d, true);

        indexer.index_body(&words(&["c"]), &d);
        indexer.update_forward(&words(&["c"]), &d, true);

        let a = indexer.dictionary.id_of("a").unwrap().clone();
        let b = indexer.dictionary.id_of("b").unwrap().clone();
        let c = indexer.dictionary.id_of("c").unwrap().clone();

        assert!(indexer.body.posting(&a, &d).is_none());
        assert!(indexer.body.posting(&b, &d).is_none());
        assert!(indexer.body.posting(&c, &d).is_some());
        assert_eq!(indexer.forward.words_of(&d), &[c]);
    }

    #[test]
    fn empty_sequences_create_nothing() {
        let mut indexer = Indexer::new();
        let d = doc("d1");
        indexer.add_words(&[]);
        indexer.index_body(&[], &d);
        indexer.index_title(&[], &d);
        indexer.update_forward(&[], &d, true);

        assert!(indexer.dictionary.is_empty());
        assert!(indexer.body.is_empty());
        assert!(indexer.title.is_empty());
        assert!(indexer.forward.is_empty());
    }
}
