use crate::analysis::analyzer::Analyzer;
use crate::core::config::RetrieverConfig;
use crate::core::error::Result;
use crate::core::types::{UrlId, WordId};
use crate::index::indexer::Indexer;
use crate::index::inverted::InvertedIndex;
use crate::registry::urls::UrlRegistry;
use crate::search::query::{ParsedQuery, QueryParser};
use crate::search::results::{Keyword, SearchHit};
use crate::search::scorer::{
    BOOST_PHRASE_BODY, BOOST_PHRASE_TITLE, BOOST_TITLE_WORD, TfIdfScorer,
};
use crate::storage::snapshot::SnapshotStore;
use std::collections::{HashMap, HashSet};
use tracing::debug;

const MAX_LINKS_PER_HIT: usize = 10;
const MAX_KEYWORDS_PER_HIT: usize = 5;

const NO_TITLE: &str = "(No Title)";
const NO_DATE: &str = "(No Date)";
const NO_SIZE: &str = "(No Size)";

/// Read-only consumer of a persisted snapshot: parses queries, scores
/// documents, and hydrates ranked hits with metadata.
pub struct Retriever {
    indexer: Indexer,
    registry: UrlRegistry,
    analyzer: Analyzer,
    parser: QueryParser,
    config: RetrieverConfig,
}

impl Retriever {
    /// Loads the snapshot at `config.db_path`.
    pub fn open(config: RetrieverConfig) -> Result<Self> {
        let store = SnapshotStore::open(config.db_path.clone())?;
        let (indexer, registry) = store.load()?;
        Ok(Retriever::with_parts(
            indexer,
            registry,
            Analyzer::standard_english(),
            config,
        ))
    }

    /// Builds a retriever over already-loaded state. The analyzer must be
    /// the one used at index time.
    pub fn with_parts(
        indexer: Indexer,
        registry: UrlRegistry,
        analyzer: Analyzer,
        config: RetrieverConfig,
    ) -> Self {
        Retriever {
            indexer,
            registry,
            analyzer,
            parser: QueryParser::new(),
            config,
        }
    }

    /// All dictionary words, e.g. for query-completion surfaces.
    pub fn all_keywords(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .indexer
            .dictionary
            .words()
            .map(|(word, _)| word.clone())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_unstable();
        words
    }

    pub fn retrieve(&self, raw_query: &str) -> Vec<SearchHit> {
        let query = self.parser.parse(raw_query, &self.analyzer);
        if query.is_empty() {
            return Vec::new();
        }
        debug!(?query, "parsed query");

        let scores = self.score_documents(&query);
        let ranked = rank(scores, self.config.max_results);

        ranked
            .into_iter()
            .filter_map(|(id, score)| self.hydrate(id, score))
            .collect()
    }

    fn score_documents(&self, query: &ParsedQuery) -> HashMap<UrlId, f64> {
        let mut scores: HashMap<UrlId, f64> = HashMap::new();

        // Query-side weights: occurrences normalized by the most frequent
        // query word.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in &query.words {
            *counts.entry(word.as_str()).or_default() += 1;
        }
        let max_count = counts.values().copied().max().unwrap_or(1);

        let scorer = TfIdfScorer::new(self.indexer.doc_count());
        for (word, count) in counts {
            let Some(word_id) = self.indexer.dictionary.id_of(word) else {
                continue; // unknown words contribute nothing
            };
            let query_weight = count as f64 / max_count as f64;

            if let Some(postings) = self.indexer.body.postings_for(word_id) {
                let max_tf = postings.values().map(|p| p.frequency).max().unwrap_or(0);
                let doc_freq = postings.len();
                for (doc, posting) in postings {
                    *scores.entry(doc.clone()).or_default() +=
                        query_weight * scorer.score(posting.frequency, max_tf, doc_freq);
                }
            }
            if let Some(postings) = self.indexer.title.postings_for(word_id) {
                for doc in postings.keys() {
                    *scores.entry(doc.clone()).or_default() += BOOST_TITLE_WORD;
                }
            }
        }

        self.apply_phrase_boosts(query, &mut scores);
        scores
    }

    /// Phrase matches boost, they never restrict: only documents matching
    /// every phrase (in body or title) receive the per-phrase boosts.
    fn apply_phrase_boosts(&self, query: &ParsedQuery, scores: &mut HashMap<UrlId, f64>) {
        if query.phrases.is_empty() {
            return;
        }

        let mut matches = Vec::with_capacity(query.phrases.len());
        for phrase in &query.phrases {
            let Some(ids) = self.phrase_word_ids(phrase) else {
                return; // a phrase with an unknown word matches nothing
            };
            let body_docs = phrase_docs(&self.indexer.body, &ids);
            let title_docs = phrase_docs(&self.indexer.title, &ids);
            matches.push((body_docs, title_docs));
        }

        let mut satisfying: Option<HashSet<UrlId>> = None;
        for (body_docs, title_docs) in &matches {
            let either: HashSet<UrlId> = body_docs.union(title_docs).cloned().collect();
            satisfying = Some(match satisfying {
                None => either,
                Some(prev) => prev.intersection(&either).cloned().collect(),
            });
        }
        let satisfying = satisfying.unwrap_or_default();

        for (body_docs, title_docs) in &matches {
            for doc in &satisfying {
                if title_docs.contains(doc) {
                    *scores.entry(doc.clone()).or_default() += BOOST_PHRASE_TITLE;
                } else if body_docs.contains(doc) {
                    *scores.entry(doc.clone()).or_default() += BOOST_PHRASE_BODY;
                }
            }
        }
    }

    fn phrase_word_ids(&self, phrase: &[String]) -> Option<Vec<WordId>> {
        phrase
            .iter()
            .map(|w| self.indexer.dictionary.id_of(w).cloned())
            .collect()
    }

    fn hydrate(&self, id: UrlId, score: f64) -> Option<SearchHit> {
        // No url, no result.
        let url = self.registry.url_of(&id)?.to_string();
        let meta = self.registry.meta_of(&id);

        let title = match meta {
            Some(m) if !m.title.is_empty() => m.title.clone(),
            _ => NO_TITLE.to_string(),
        };
        let last_modified = match meta {
            Some(m) if !m.last_modified.is_empty() => m.last_modified.clone(),
            _ => NO_DATE.to_string(),
        };
        let size = match meta {
            Some(m) => m.size.to_string(),
            None => NO_SIZE.to_string(),
        };

        Some(SearchHit {
            keywords: self.top_keywords(&id, MAX_KEYWORDS_PER_HIT),
            parent_links: self.resolve_links(self.registry.parents_of(&id)),
            child_links: self.resolve_links(self.registry.children_of(&id)),
            url_id: id,
            score,
            title,
            url,
            last_modified,
            size,
        })
    }

    /// Most frequent body keywords of a document; words containing digits
    /// are dropped.
    fn top_keywords(&self, id: &UrlId, limit: usize) -> Vec<Keyword> {
        let mut keywords: Vec<Keyword> = self
            .indexer
            .forward
            .words_of(id)
            .iter()
            .filter_map(|word_id| {
                let frequency = self.indexer.body.posting(word_id, id)?.frequency;
                let word = self.indexer.dictionary.word_of(word_id)?;
                if word.is_empty() || !word.chars().all(char::is_alphabetic) {
                    return None;
                }
                Some(Keyword {
                    word: word.to_string(),
                    frequency,
                })
            })
            .collect();

        keywords.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.word.cmp(&b.word))
        });
        keywords.truncate(limit);
        keywords
    }

    fn resolve_links(&self, ids: &[UrlId]) -> Vec<String> {
        ids.iter()
            .take(MAX_LINKS_PER_HIT)
            .filter_map(|id| self.registry.url_of(id).map(String::from))
            .collect()
    }
}

/// Sort by score descending, then url id ascending for determinism, and
/// keep the top `max_results`.
fn rank(scores: HashMap<UrlId, f64>, max_results: usize) -> Vec<(UrlId, f64)> {
    let mut ranked: Vec<(UrlId, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(max_results);
    ranked
}

/// Documents where the word sequence occurs at consecutive positions.
fn phrase_docs(index: &InvertedIndex, word_ids: &[WordId]) -> HashSet<UrlId> {
    let mut docs = HashSet::new();
    let Some(first) = word_ids.first() else {
        return docs;
    };
    let Some(first_postings) = index.postings_for(first) else {
        return docs;
    };

    'candidates: for (doc, first_posting) in first_postings {
        let mut rest = Vec::with_capacity(word_ids.len() - 1);
        for word in &word_ids[1..] {
            match index.posting(word, doc) {
                Some(posting) => rest.push(posting),
                None => continue 'candidates,
            }
        }
        let matched = first_posting.positions.iter().any(|&start| {
            rest.iter()
                .enumerate()
                .all(|(offset, posting)| posting.has_position(start + offset as u32 + 1))
        });
        if matched {
            docs.insert(doc.clone());
        }
    }
    docs
}
