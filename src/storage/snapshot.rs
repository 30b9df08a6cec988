use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{PageMeta, UrlId, WordId};
use crate::index::indexer::Indexer;
use crate::registry::urls::UrlRegistry;
use crate::storage::encoding;
use crate::storage::layout::StorageLayout;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub const BODY_INVERTED_INDEX: &str = "body_inverted_index";
pub const TITLE_INVERTED_INDEX: &str = "title_inverted_index";
pub const FORWARD_INDEX: &str = "forward_index";
pub const WORD_TO_ID: &str = "word_to_id";
pub const ID_TO_WORD: &str = "id_to_word";
pub const URL_TO_ID: &str = "url_to_id";
pub const ID_TO_URL: &str = "id_to_url";
pub const ID_TO_PAGE_TITLE: &str = "id_to_page_title";
pub const ID_TO_LAST_MODIFICATION_DATE: &str = "id_to_last_modification_date";
pub const ID_TO_PAGE_SIZE: &str = "id_to_page_size";
pub const ID_TO_CHILDREN_URL_ID: &str = "id_to_children_url_id";
pub const ID_TO_PARENTS_URL_ID: &str = "id_to_parents_url_id";

pub type Table = (String, Vec<(String, String)>);

/// Key/value snapshot store. Each flush rewrites every table wholesale:
/// rows go to a temp file which is renamed over the previous table, so a
/// failed flush leaves the prior snapshot intact.
#[derive(Debug)]
pub struct SnapshotStore {
    layout: StorageLayout,
}

impl SnapshotStore {
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(SnapshotStore {
            layout: StorageLayout::new(base_dir.into())?,
        })
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.layout.base_dir
    }

    pub fn write_tables(&self, tables: &[Table]) -> Result<()> {
        for (name, rows) in tables {
            self.write_table(name, rows)?;
        }
        Ok(())
    }

    fn write_table(&self, name: &str, rows: &[(String, String)]) -> Result<()> {
        let tmp = self.layout.tmp_path(name);
        let target = self.layout.table_path(name);

        let mut sorted: Vec<&(String, String)> = rows.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let file = File::create(&tmp)
            .map_err(|e| Error::new(ErrorKind::Storage, format!("create {name}: {e}")))?;
        let mut writer = BufWriter::new(file);
        for (key, value) in sorted {
            writeln!(writer, "{}\t{}", key, value)
                .map_err(|e| Error::new(ErrorKind::Storage, format!("write {name}: {e}")))?;
        }
        writer
            .into_inner()
            .map_err(|e| Error::new(ErrorKind::Storage, format!("flush {name}: {e}")))?
            .sync_all()
            .map_err(|e| Error::new(ErrorKind::Storage, format!("sync {name}: {e}")))?;

        fs::rename(&tmp, &target)
            .map_err(|e| Error::new(ErrorKind::Storage, format!("publish {name}: {e}")))?;
        Ok(())
    }

    /// Reads one table; a missing file is an empty table (fresh store).
    pub fn read_table(&self, name: &str) -> Result<Vec<(String, String)>> {
        let path = self.layout.table_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::new(ErrorKind::Storage, format!("read {name}: {e}")))?;

        let mut rows = Vec::new();
        for line in content.lines() {
            let Some((key, value)) = line.split_once('\t') else {
                return Err(Error::new(
                    ErrorKind::Parse,
                    format!("malformed row in {name}: {line:?}"),
                ));
            };
            rows.push((key.to_string(), value.to_string()));
        }
        Ok(rows)
    }

    /// Rebuilds the in-memory state from the persisted snapshot.
    pub fn load(&self) -> Result<(Indexer, UrlRegistry)> {
        let mut indexer = Indexer::new();
        let mut registry = UrlRegistry::new();

        for (word, id) in self.read_table(WORD_TO_ID)? {
            indexer.dictionary.insert(word, WordId::new(id));
        }
        for (word_id, value) in self.read_table(BODY_INVERTED_INDEX)? {
            for (url, posting) in encoding::decode_postings(&value)? {
                indexer.body.insert_raw(WordId::new(&word_id), url, posting);
            }
        }
        for (word_id, value) in self.read_table(TITLE_INVERTED_INDEX)? {
            for (url, posting) in encoding::decode_postings(&value)? {
                indexer.title.insert_raw(WordId::new(&word_id), url, posting);
            }
        }
        for (url_id, value) in self.read_table(FORWARD_INDEX)? {
            indexer
                .forward
                .insert_raw(UrlId::new(url_id), encoding::decode_word_ids(&value));
        }

        for (url, id) in self.read_table(URL_TO_ID)? {
            registry.insert(url, UrlId::new(id));
        }
        for (url_id, value) in self.read_table(ID_TO_CHILDREN_URL_ID)? {
            registry.set_children(UrlId::new(url_id), encoding::decode_url_ids(&value));
        }
        for (url_id, value) in self.read_table(ID_TO_PARENTS_URL_ID)? {
            registry.set_parents(UrlId::new(url_id), encoding::decode_url_ids(&value));
        }

        let dates: HashMap<String, String> =
            self.read_table(ID_TO_LAST_MODIFICATION_DATE)?.into_iter().collect();
        let sizes: HashMap<String, String> =
            self.read_table(ID_TO_PAGE_SIZE)?.into_iter().collect();
        for (url_id, title) in self.read_table(ID_TO_PAGE_TITLE)? {
            let meta = PageMeta {
                title,
                last_modified: dates.get(&url_id).cloned().unwrap_or_default(),
                size: sizes
                    .get(&url_id)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            };
            registry.set_page_meta(&UrlId::new(url_id), meta);
        }

        Ok((indexer, registry))
    }
}

/// Encodes the full in-memory state as table rows, ready for
/// `SnapshotStore::write_tables`. Pure CPU work, safe to run under the
/// crawl lock.
pub fn snapshot_tables(indexer: &Indexer, registry: &UrlRegistry) -> Vec<Table> {
    let mut tables = Vec::with_capacity(12);

    tables.push((
        BODY_INVERTED_INDEX.to_string(),
        indexer
            .body
            .words()
            .map(|(word, docs)| (word.as_str().to_string(), encoding::encode_postings(docs)))
            .collect(),
    ));
    tables.push((
        TITLE_INVERTED_INDEX.to_string(),
        indexer
            .title
            .words()
            .map(|(word, docs)| (word.as_str().to_string(), encoding::encode_postings(docs)))
            .collect(),
    ));
    tables.push((
        FORWARD_INDEX.to_string(),
        indexer
            .forward
            .entries()
            .map(|(url, words)| (url.as_str().to_string(), encoding::encode_word_ids(words)))
            .collect(),
    ));

    tables.push((
        WORD_TO_ID.to_string(),
        indexer
            .dictionary
            .words()
            .map(|(word, id)| (word.clone(), id.as_str().to_string()))
            .collect(),
    ));
    tables.push((
        ID_TO_WORD.to_string(),
        indexer
            .dictionary
            .words()
            .map(|(word, id)| (id.as_str().to_string(), word.clone()))
            .collect(),
    ));

    tables.push((
        URL_TO_ID.to_string(),
        registry
            .urls()
            .map(|(url, id)| (url.clone(), id.as_str().to_string()))
            .collect(),
    ));
    tables.push((
        ID_TO_URL.to_string(),
        registry
            .urls()
            .map(|(url, id)| (id.as_str().to_string(), url.clone()))
            .collect(),
    ));

    tables.push((
        ID_TO_PAGE_TITLE.to_string(),
        registry
            .metas()
            .map(|(id, meta)| (id.as_str().to_string(), meta.title.clone()))
            .collect(),
    ));
    tables.push((
        ID_TO_LAST_MODIFICATION_DATE.to_string(),
        registry
            .metas()
            .map(|(id, meta)| (id.as_str().to_string(), meta.last_modified.clone()))
            .collect(),
    ));
    tables.push((
        ID_TO_PAGE_SIZE.to_string(),
        registry
            .metas()
            .map(|(id, meta)| (id.as_str().to_string(), meta.size.to_string()))
            .collect(),
    ));

    tables.push((
        ID_TO_CHILDREN_URL_ID.to_string(),
        registry
            .adjacency_children()
            .map(|(id, children)| (id.as_str().to_string(), encoding::encode_url_ids(children)))
            .collect(),
    ));
    tables.push((
        ID_TO_PARENTS_URL_ID.to_string(),
        registry
            .adjacency_parents()
            .map(|(id, parents)| (id.as_str().to_string(), encoding::encode_url_ids(parents)))
            .collect(),
    ));

    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> (Indexer, UrlRegistry) {
        let mut indexer = Indexer::new();
        let mut registry = UrlRegistry::new();

        let page = registry.get_or_create("http://example.com/");
        let child = registry.get_or_create("http://example.com/child");
        registry.record_link(&page, &child);
        registry.set_page_meta(
            &page,
            PageMeta {
                title: "Example".to_string(),
                last_modified: "Mon, 01 Jan 2024 00:00:00 GMT".to_string(),
                size: 512,
            },
        );

        let body: Vec<String> = ["quick", "fox", "quick"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let title: Vec<String> = ["fox"].iter().map(|s| s.to_string()).collect();
        indexer.index_body(&body, &page);
        indexer.index_title(&title, &page);
        indexer.update_forward(&body, &page, true);
        indexer.update_forward(&title, &page, false);

        (indexer, registry)
    }

    #[test]
    fn snapshot_round_trips_through_the_store() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let (indexer, registry) = sample_state();
        store
            .write_tables(&snapshot_tables(&indexer, &registry))
            .unwrap();

        let (loaded_indexer, loaded_registry) = store.load().unwrap();

        let page = loaded_registry.id_of("http://example.com/").unwrap().clone();
        let child = loaded_registry
            .id_of("http://example.com/child")
            .unwrap()
            .clone();
        assert!(loaded_registry.children_of(&page).contains(&child));
        assert!(loaded_registry.parents_of(&child).contains(&page));

        let meta = loaded_registry.meta_of(&page).unwrap();
        assert_eq!(meta.title, "Example");
        assert_eq!(meta.size, 512);

        let quick = loaded_indexer.dictionary.id_of("quick").unwrap().clone();
        let posting = loaded_indexer.body.posting(&quick, &page).unwrap();
        assert_eq!(posting.frequency, 2);
        assert_eq!(posting.positions, vec![0, 2]);
        assert_eq!(loaded_indexer.doc_count(), 1);
    }

    #[test]
    fn flush_replaces_tables_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        store
            .write_tables(&[(
                WORD_TO_ID.to_string(),
                vec![("stale".to_string(), "1".to_string())],
            )])
            .unwrap();
        store
            .write_tables(&[(
                WORD_TO_ID.to_string(),
                vec![("fresh".to_string(), "2".to_string())],
            )])
            .unwrap();

        let rows = store.read_table(WORD_TO_ID).unwrap();
        assert_eq!(rows, vec![("fresh".to_string(), "2".to_string())]);
    }

    #[test]
    fn missing_tables_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(store.read_table(BODY_INVERTED_INDEX).unwrap().is_empty());

        let (indexer, registry) = store.load().unwrap();
        assert_eq!(indexer.doc_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn rows_are_persisted_sorted_by_key() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        store
            .write_tables(&[(
                WORD_TO_ID.to_string(),
                vec![
                    ("zebra".to_string(), "1".to_string()),
                    ("apple".to_string(), "2".to_string()),
                ],
            )])
            .unwrap();

        let rows = store.read_table(WORD_TO_ID).unwrap();
        assert_eq!(rows[0].0, "apple");
        assert_eq!(rows[1].0, "zebra");
    }
}
