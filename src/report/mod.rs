use crate::core::error::Result;
use crate::core::types::UrlId;
use crate::index::indexer::Indexer;
use crate::storage::snapshot::SnapshotStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SEPARATOR_WIDTH: usize = 30;
const MAX_KEYWORDS: usize = 10;
const MAX_CHILD_LINKS: usize = 10;

/// Dumps a human-readable crawl summary: per document its title, url,
/// `lastModified, size` line, top keywords with frequencies, and up to ten
/// child links, blocks separated by a dashed line. Documents are ordered
/// by url.
pub fn write_crawl_report(store: &SnapshotStore, output: &Path) -> Result<()> {
    let (indexer, registry) = store.load()?;

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);

    let mut documents: Vec<(&String, &UrlId)> = registry.urls().collect();
    documents.sort_by(|a, b| a.0.cmp(b.0));

    for (url, id) in documents {
        let (title, last_modified, size) = match registry.meta_of(id) {
            Some(meta) => (
                meta.title.clone(),
                meta.last_modified.clone(),
                meta.size.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        writeln!(writer, "{title}")?;
        writeln!(writer, "{url}")?;
        writeln!(writer, "{last_modified}, {size}")?;
        writeln!(writer, "{}", top_keywords(&indexer, id, MAX_KEYWORDS).join("; "))?;
        for child in registry.children_of(id).iter().take(MAX_CHILD_LINKS) {
            if let Some(child_url) = registry.url_of(child) {
                writeln!(writer, "{child_url}")?;
            }
        }
        writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    }

    writer.flush()?;
    Ok(())
}

fn top_keywords(indexer: &Indexer, id: &UrlId, limit: usize) -> Vec<String> {
    let mut pairs: Vec<(String, u32)> = indexer
        .forward
        .words_of(id)
        .iter()
        .filter_map(|word_id| {
            let frequency = indexer.body.posting(word_id, id)?.frequency;
            let word = indexer.dictionary.word_of(word_id)?;
            Some((word.to_string(), frequency))
        })
        .collect();

    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(limit);
    pairs
        .into_iter()
        .map(|(word, frequency)| format!("{word} {frequency}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PageMeta;
    use crate::registry::urls::UrlRegistry;
    use crate::storage::snapshot::snapshot_tables;
    use tempfile::TempDir;

    #[test]
    fn report_lists_every_document_block() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let mut indexer = Indexer::new();
        let mut registry = UrlRegistry::new();
        let home = registry.get_or_create("http://site.test/");
        let child = registry.get_or_create("http://site.test/child");
        registry.record_link(&home, &child);
        registry.set_page_meta(
            &home,
            PageMeta {
                title: "Home".to_string(),
                last_modified: "Mon, 01 Jan 2024 00:00:00 GMT".to_string(),
                size: 128,
            },
        );
        let words: Vec<String> = ["archive", "archive", "paper"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        indexer.index_body(&words, &home);
        indexer.update_forward(&words, &home, true);

        store
            .write_tables(&snapshot_tables(&indexer, &registry))
            .unwrap();

        let output = dir.path().join("spider_result.txt");
        write_crawl_report(&store, &output).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();

        // One block per registered url, fetched or not.
        assert_eq!(content.matches(&"-".repeat(30)).count(), 2);
        assert!(content.contains("Home\nhttp://site.test/\nMon, 01 Jan 2024 00:00:00 GMT, 128\narchive 2; paper 1\nhttp://site.test/child\n"));
        // The unfetched child renders empty metadata.
        assert!(content.contains("\nhttp://site.test/child\n, \n"));
    }
}
