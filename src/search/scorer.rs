/// Additive boost for a query word appearing in a document title.
pub const BOOST_TITLE_WORD: f64 = 7.0;
/// Additive boost for a phrase matching in a document title.
pub const BOOST_PHRASE_TITLE: f64 = 10.0;
/// Additive boost for a phrase matching in a document body.
pub const BOOST_PHRASE_BODY: f64 = 3.0;

/// tf·idf with per-term max-frequency normalization:
/// `tf = freq / max_tf(term)`, `idf = log2(N / df)`. A term with zero
/// document frequency contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct TfIdfScorer {
    pub total_docs: usize,
}

impl TfIdfScorer {
    pub fn new(total_docs: usize) -> Self {
        TfIdfScorer { total_docs }
    }

    pub fn score(&self, term_freq: u32, max_tf: u32, doc_freq: usize) -> f64 {
        if self.total_docs == 0 || doc_freq == 0 || max_tf == 0 {
            return 0.0;
        }
        let tf = f64::from(term_freq) / f64::from(max_tf);
        let idf = (self.total_docs as f64 / doc_freq as f64).log2();
        tf * idf
    }
}
