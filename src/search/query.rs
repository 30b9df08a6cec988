use crate::analysis::analyzer::Analyzer;
use regex::Regex;

/// A parsed free-text query: every normalized word with multiplicity, plus
/// quoted phrases as normalized word sequences. Stopwords inside a phrase
/// are dropped before matching; the survivors keep their relative order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub words: Vec<String>,
    pub phrases: Vec<Vec<String>>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.phrases.is_empty()
    }
}

/// Splits a raw query into quoted phrases and barewords, then runs both
/// through the index-time analyzer.
pub struct QueryParser {
    pattern: Regex,
}

impl QueryParser {
    pub fn new() -> Self {
        // Quoted phrase, or a maximal run of word characters.
        QueryParser {
            pattern: Regex::new(r#""([^"]+)"|\w+"#).expect("valid query pattern"),
        }
    }

    pub fn parse(&self, raw: &str, analyzer: &Analyzer) -> ParsedQuery {
        let mut query = ParsedQuery::default();

        for capture in self.pattern.captures_iter(raw) {
            if let Some(phrase) = capture.get(1) {
                let words = analyzer.normalize(phrase.as_str());
                if !words.is_empty() {
                    query.words.extend(words.clone());
                    query.phrases.push(words);
                }
            } else {
                query.words.extend(analyzer.normalize(&capture[0]));
            }
        }

        query
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        QueryParser::new()
    }
}
