use crate::analysis::analyzer::Analyzer;
use crate::core::config::CrawlerConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::PageMeta;
use crate::crawler::frontier::{Frontier, FrontierItem};
use crate::fetch::client::{Fetcher, HttpFetcher};
use crate::fetch::extract::ContentExtractor;
use crate::index::indexer::Indexer;
use crate::registry::urls::UrlRegistry;
use crate::storage::snapshot::{SnapshotStore, Table, snapshot_tables};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How long a worker blocks on an empty frontier before re-checking the
/// stop signal.
const DEQUEUE_WAIT: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub pages_indexed: usize,
    pub urls_discovered: usize,
    pub distinct_words: usize,
    pub elapsed_ms: u64,
    pub started_at: DateTime<Utc>,
}

/// All mutable crawl state behind one coarse mutex. Fetches and extraction
/// run outside the lock; only the in-memory update block holds it.
#[derive(Default)]
struct CrawlState {
    registry: UrlRegistry,
    indexer: Indexer,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
    pending: usize,
    flush_error: Option<Error>,
}

struct WorkerCtx<F: Fetcher> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    extractor: Arc<ContentExtractor>,
    analyzer: Arc<Analyzer>,
    state: Arc<Mutex<CrawlState>>,
    frontier: Arc<Frontier>,
    stop: Arc<AtomicBool>,
    store: Arc<SnapshotStore>,
}

impl<F: Fetcher> Clone for WorkerCtx<F> {
    fn clone(&self) -> Self {
        WorkerCtx {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            analyzer: self.analyzer.clone(),
            state: self.state.clone(),
            frontier: self.frontier.clone(),
            stop: self.stop.clone(),
            store: self.store.clone(),
        }
    }
}

/// Breadth-first crawler over a worker pool. BFS order is approximate under
/// concurrency; the hard guarantees are the page budget and adjacency
/// completeness for successfully fetched pages.
pub struct Crawler<F: Fetcher + 'static> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    extractor: Arc<ContentExtractor>,
    analyzer: Arc<Analyzer>,
    store: Arc<SnapshotStore>,
}

impl Crawler<HttpFetcher> {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Crawler::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher + 'static> Crawler<F> {
    pub fn with_fetcher(config: CrawlerConfig, fetcher: F) -> Result<Self> {
        let store = SnapshotStore::open(config.storage_path.clone())?;
        Ok(Crawler {
            config,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(ContentExtractor::new()),
            analyzer: Arc::new(Analyzer::standard_english()),
            store: Arc::new(store),
        })
    }

    /// Replaces the text pipeline. Index-time and query-time analysis must
    /// match, so whoever retrieves from this store needs the same pipeline.
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    pub async fn crawl(&self) -> Result<CrawlSummary> {
        if self.config.seed.is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument, "seed url is required"));
        }

        let started = Instant::now();
        let started_at = Utc::now();

        // Resume from any prior snapshot so url and word ids stay stable
        // across restarts; visited/enqueued start empty and every page is
        // re-crawled (re-indexing replaces postings wholesale).
        let (indexer, registry) = self.store.load()?;
        let state = Arc::new(Mutex::new(CrawlState {
            registry,
            indexer,
            ..CrawlState::default()
        }));
        let frontier = Arc::new(Frontier::new());
        let stop = Arc::new(AtomicBool::new(false));

        state.lock().enqueued.insert(self.config.seed.clone());
        frontier.enqueue(FrontierItem::seed(self.config.seed.clone()));

        let ctx = WorkerCtx {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            analyzer: self.analyzer.clone(),
            state: state.clone(),
            frontier: frontier.clone(),
            stop: stop.clone(),
            store: self.store.clone(),
        };

        let workers = self.config.workers.max(1);
        info!(seed = %self.config.seed, workers, max_pages = self.config.max_pages, "starting crawl");

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            handles.push(tokio::spawn(worker_loop(ctx.clone(), worker_id)));
        }
        for handle in handles {
            handle
                .await
                .map_err(|e| Error::new(ErrorKind::Internal, format!("worker failed: {e}")))?;
        }

        // Final flush so every visited page is durable.
        let (tables, pages_indexed, urls_discovered, distinct_words, prior_error) = {
            let mut state = state.lock();
            (
                snapshot_tables(&state.indexer, &state.registry),
                state.visited.len(),
                state.registry.len(),
                state.indexer.dictionary.len(),
                state.flush_error.take(),
            )
        };
        if let Some(e) = prior_error {
            return Err(e);
        }
        write_snapshot(&self.store, tables).await?;

        let summary = CrawlSummary {
            pages_indexed,
            urls_discovered,
            distinct_words,
            elapsed_ms: started.elapsed().as_millis() as u64,
            started_at,
        };
        info!(
            pages = summary.pages_indexed,
            urls = summary.urls_discovered,
            elapsed_ms = summary.elapsed_ms,
            "crawl finished"
        );
        Ok(summary)
    }
}

async fn worker_loop<F: Fetcher + 'static>(ctx: WorkerCtx<F>, worker_id: usize) {
    loop {
        if ctx.stop.load(Ordering::SeqCst) {
            break;
        }
        let Some(item) = ctx.frontier.dequeue(DEQUEUE_WAIT).await else {
            if ctx.stop.load(Ordering::SeqCst) || ctx.frontier.is_idle() {
                break;
            }
            continue;
        };
        // A stop observed after dequeue means no new fetch may start.
        if ctx.stop.load(Ordering::SeqCst) {
            ctx.frontier.task_done();
            break;
        }
        let already_visited = ctx.state.lock().visited.contains(&item.url);
        if already_visited {
            ctx.frontier.task_done();
            continue;
        }

        process_page(&ctx, &item).await;
        ctx.frontier.task_done();
    }
    debug!(worker_id, "worker exiting");
}

async fn process_page<F: Fetcher>(ctx: &WorkerCtx<F>, item: &FrontierItem) {
    let page = match ctx.fetcher.fetch(&item.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %item.url, error = %e, "fetch failed, skipping page");
            return;
        }
    };

    let html = page.decode_body();
    let extracted = ctx.extractor.extract(&html, &item.url);
    let body_words = ctx.analyzer.normalize(&extracted.body_text);
    let title_words = ctx.analyzer.normalize(&extracted.title);
    let last_modified = page.last_modification_date();
    let size = page.page_size(&extracted.body_text);

    let mut to_enqueue = Vec::new();
    let mut pending_tables: Option<Vec<Table>> = None;
    let mut raised_stop = false;
    {
        let mut state = ctx.state.lock();
        // Another worker may have indexed this url, or filled the budget,
        // while our fetch was in flight. Such a page must not be counted
        // and must leave no postings.
        if state.visited.contains(&item.url) || state.visited.len() >= ctx.config.max_pages {
            return;
        }

        let current = state.registry.get_or_create(&item.url);
        state.indexer.add_words(&body_words);
        state.indexer.add_words(&title_words);
        state.indexer.index_body(&body_words, &current);
        state.indexer.index_title(&title_words, &current);
        state.indexer.update_forward(&body_words, &current, true);
        state.indexer.update_forward(&title_words, &current, false);
        state.registry.set_page_meta(
            &current,
            PageMeta {
                title: extracted.title.clone(),
                last_modified,
                size,
            },
        );

        for link in &extracted.links {
            let child = state.registry.get_or_create(link);
            state.registry.record_link(&current, &child);
            if !state.enqueued.contains(link) && !state.visited.contains(link) {
                state.enqueued.insert(link.clone());
                to_enqueue.push(FrontierItem {
                    url: link.clone(),
                    parent: Some(current.clone()),
                });
            }
        }

        state.visited.insert(item.url.clone());
        state.pending += 1;
        if state.visited.len() >= ctx.config.max_pages {
            ctx.stop.store(true, Ordering::SeqCst);
            raised_stop = true;
        }
        if state.pending >= ctx.config.batch_size {
            state.pending = 0;
            pending_tables = Some(snapshot_tables(&state.indexer, &state.registry));
        }
    }

    info!(url = %item.url, "indexed page");
    for queued in to_enqueue {
        ctx.frontier.enqueue(queued);
    }
    if raised_stop {
        info!(max_pages = ctx.config.max_pages, "page budget reached, stopping crawl");
        ctx.frontier.wake_all();
    }
    if let Some(tables) = pending_tables {
        if let Err(e) = write_snapshot(&ctx.store, tables).await {
            error!(error = %e, "flush failed, stopping crawl");
            ctx.state.lock().flush_error.get_or_insert(e);
            ctx.stop.store(true, Ordering::SeqCst);
            ctx.frontier.wake_all();
        }
    }
}

async fn write_snapshot(store: &Arc<SnapshotStore>, tables: Vec<Table>) -> Result<()> {
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.write_tables(&tables))
        .await
        .map_err(|e| Error::new(ErrorKind::Internal, format!("flush task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::client::FetchedPage;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::future::Future;
    use tempfile::TempDir;

    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl MockFetcher {
        fn new(pages: Vec<(&str, String)>) -> Self {
            MockFetcher {
                pages: pages
                    .into_iter()
                    .map(|(url, html)| (url.to_string(), html))
                    .collect(),
            }
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send {
            let result = match self.pages.get(url) {
                Some(html) => Ok(FetchedPage {
                    body: Bytes::from(html.clone()),
                    last_modified: Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
                    date: None,
                    content_length: None,
                }),
                None => Err(Error::new(ErrorKind::Fetch, format!("no route to {url}"))),
            };
            async move { result }
        }
    }

    fn page(title: &str, body: &str, links: &[String]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!("<a href=\"{l}\">link</a>"))
            .collect();
        format!("<html><head><title>{title}</title></head><body><p>{body}</p>{anchors}</body></html>")
    }

    fn config(dir: &TempDir, seed: &str, max_pages: usize) -> CrawlerConfig {
        CrawlerConfig {
            seed: seed.to_string(),
            max_pages,
            workers: 4,
            batch_size: 10,
            storage_path: dir.path().to_path_buf(),
            ..CrawlerConfig::default()
        }
    }

    #[tokio::test]
    async fn crawl_respects_the_page_budget() {
        let dir = TempDir::new().unwrap();
        let seed = "http://site.test/";
        let child_urls: Vec<String> = (0..200)
            .map(|i| format!("http://site.test/page/{i}"))
            .collect();

        let mut fetcher_pages = vec![(seed, page("Home", "welcome home", &child_urls))];
        for (i, url) in child_urls.iter().enumerate() {
            fetcher_pages.push((url.as_str(), page("Child", &format!("child page {i}"), &[])));
        }

        let crawler = Crawler::with_fetcher(
            config(&dir, seed, 50),
            MockFetcher::new(fetcher_pages),
        )
        .unwrap()
        .with_analyzer(Analyzer::plain());

        let summary = crawler.crawl().await.unwrap();
        assert_eq!(summary.pages_indexed, 50);
        assert_eq!(summary.urls_discovered, 201);

        let store = SnapshotStore::open(dir.path()).unwrap();
        let (indexer, registry) = store.load().unwrap();

        // Every sighted child has an id and adjacency, visited or not.
        let seed_id = registry.id_of(seed).unwrap().clone();
        assert_eq!(registry.children_of(&seed_id).len(), 200);
        for url in &child_urls {
            let id = registry.id_of(url).unwrap();
            assert!(registry.parents_of(id).contains(&seed_id));
        }

        // Only indexed pages carry postings.
        assert_eq!(indexer.doc_count(), 50);
    }

    #[tokio::test]
    async fn failed_fetches_are_skipped_without_postings() {
        let dir = TempDir::new().unwrap();
        let seed = "http://site.test/";
        let missing = "http://site.test/missing".to_string();

        let crawler = Crawler::with_fetcher(
            config(&dir, seed, 10),
            MockFetcher::new(vec![(
                seed,
                page("Home", "welcome home", std::slice::from_ref(&missing)),
            )]),
        )
        .unwrap()
        .with_analyzer(Analyzer::plain());

        let summary = crawler.crawl().await.unwrap();
        assert_eq!(summary.pages_indexed, 1);

        let store = SnapshotStore::open(dir.path()).unwrap();
        let (indexer, registry) = store.load().unwrap();
        let missing_id = registry.id_of(&missing).unwrap().clone();

        assert!(registry.meta_of(&missing_id).is_none());
        assert!(!indexer.body.contains_doc(&missing_id));
        assert!(indexer.forward.words_of(&missing_id).is_empty());
    }

    #[tokio::test]
    async fn recrawling_a_page_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let seed = "http://site.test/";
        let pages = vec![(seed, page("Home", "alpha beta alpha", &[]))];

        let crawler = Crawler::with_fetcher(config(&dir, seed, 5), MockFetcher::new(pages))
            .unwrap()
            .with_analyzer(Analyzer::plain());

        crawler.crawl().await.unwrap();
        crawler.crawl().await.unwrap();

        let store = SnapshotStore::open(dir.path()).unwrap();
        let (indexer, registry) = store.load().unwrap();
        let seed_id = registry.id_of(seed).unwrap().clone();
        let alpha = indexer.dictionary.id_of("alpha").unwrap().clone();

        let posting = indexer.body.posting(&alpha, &seed_id).unwrap();
        assert_eq!(posting.frequency, 2);
        assert_eq!(posting.positions, vec![0, 2]);
        assert_eq!(indexer.doc_count(), 1);
    }

    #[tokio::test]
    async fn empty_seed_is_rejected() {
        let dir = TempDir::new().unwrap();
        let crawler = Crawler::with_fetcher(
            config(&dir, "", 5),
            MockFetcher::new(Vec::new()),
        )
        .unwrap();
        assert!(crawler.crawl().await.is_err());
    }
}
