use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{UrlId, WordId};
use crate::index::posting::Posting;
use std::collections::HashMap;

/// Textual encodings of the persisted index values. Inverted index rows are
/// space-separated `urlId;frequency;pos,pos,...` entries; id lists are
/// space-separated ids.

pub fn encode_postings(docs: &HashMap<UrlId, Posting>) -> String {
    let mut entries: Vec<(&UrlId, &Posting)> = docs.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    entries
        .iter()
        .map(|(url, posting)| {
            let positions = posting
                .positions
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            format!("{};{};{}", url, posting.frequency, positions)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_postings(value: &str) -> Result<HashMap<UrlId, Posting>> {
    let mut docs = HashMap::new();
    for entry in value.split_whitespace() {
        let mut parts = entry.splitn(3, ';');
        let (Some(url), Some(frequency), Some(positions)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::new(
                ErrorKind::Parse,
                format!("malformed posting entry: {entry:?}"),
            ));
        };

        let frequency: u32 = frequency
            .parse()
            .map_err(|_| Error::new(ErrorKind::Parse, format!("bad frequency in {entry:?}")))?;
        let positions = positions
            .split(',')
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| Error::new(ErrorKind::Parse, format!("bad position in {entry:?}")))
            })
            .collect::<Result<Vec<u32>>>()?;

        let posting = Posting {
            frequency,
            positions,
        };
        if !posting.is_consistent() {
            return Err(Error::new(
                ErrorKind::Parse,
                format!("inconsistent posting entry: {entry:?}"),
            ));
        }
        docs.insert(UrlId::new(url), posting);
    }
    Ok(docs)
}

/// Forward index values are persisted in sorted order so repeated flushes
/// of the same state produce identical bytes.
pub fn encode_word_ids(words: &[WordId]) -> String {
    let mut ids: Vec<&str> = words.iter().map(WordId::as_str).collect();
    ids.sort_unstable();
    ids.join(" ")
}

pub fn decode_word_ids(value: &str) -> Vec<WordId> {
    value.split_whitespace().map(WordId::new).collect()
}

/// Adjacency values keep first-seen order; a url id never appears twice.
pub fn encode_url_ids(urls: &[UrlId]) -> String {
    urls.iter()
        .map(UrlId::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_url_ids(value: &str) -> Vec<UrlId> {
    value.split_whitespace().map(UrlId::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postings_encode_to_the_documented_format() {
        let mut docs = HashMap::new();
        docs.insert(UrlId::new("42"), Posting::from_positions(vec![0, 17, 42]));
        docs.insert(UrlId::new("81"), Posting::from_positions(vec![5]));

        assert_eq!(encode_postings(&docs), "42;3;0,17,42 81;1;5");
    }

    #[test]
    fn postings_round_trip() {
        let mut docs = HashMap::new();
        docs.insert(UrlId::new("7"), Posting::from_positions(vec![1, 2, 30]));
        docs.insert(UrlId::new("9"), Posting::from_positions(vec![0]));

        let decoded = decode_postings(&encode_postings(&docs)).unwrap();
        assert_eq!(decoded, docs);
    }

    #[test]
    fn decode_rejects_frequency_mismatch() {
        assert!(decode_postings("42;2;5").is_err());
    }

    #[test]
    fn decode_rejects_descending_positions() {
        assert!(decode_postings("42;2;9,3").is_err());
    }

    #[test]
    fn word_ids_round_trip_sorted() {
        let words = vec![WordId::new("30"), WordId::new("12"), WordId::new("7")];
        let encoded = encode_word_ids(&words);
        assert_eq!(encoded, "12 30 7");
        assert_eq!(
            decode_word_ids(&encoded),
            vec![WordId::new("12"), WordId::new("30"), WordId::new("7")]
        );
    }

    #[test]
    fn url_ids_round_trip_in_order() {
        let urls = vec![UrlId::new("b"), UrlId::new("a")];
        let encoded = encode_url_ids(&urls);
        assert_eq!(encoded, "b a");
        assert_eq!(decode_url_ids(&encoded), urls);
    }

    #[test]
    fn empty_values_decode_to_empty() {
        assert!(decode_postings("").unwrap().is_empty());
        assert!(decode_word_ids("").is_empty());
        assert!(decode_url_ids("").is_empty());
    }
}
