pub mod analysis;
pub mod core;
pub mod crawler;
pub mod fetch;
pub mod index;
pub mod registry;
pub mod report;
pub mod search;
pub mod storage;

/*
┌──────────────────────────────────────────────────────────────────────────┐
│                         SPINDEX ARCHITECTURE                             │
└──────────────────────────────────────────────────────────────────────────┘

  crawl:   seed ─> Frontier ─> worker ─> HttpFetcher ─> ContentExtractor
                      ▲                                        │
                      │ outlinks                               ▼
                      └──────── Mutex<CrawlState> <── Analyzer (normalize)
                                │
                                ├─ UrlRegistry   url <-> urlId, adjacency,
                                │                page metadata
                                ├─ Indexer       WordDictionary + body/title
                                │                InvertedIndex + ForwardIndex
                                └─ batched flush ─> SnapshotStore (*.tbl,
                                                    temp file + rename)

  query:   raw text ─> QueryParser (barewords + "quoted phrases")
                          │ Analyzer (same pipeline as index time)
                          ▼
           Retriever ─ TfIdfScorer + title/phrase boosts ─> ranked
                          │                                 SearchHits
                          └─ reads the loaded snapshot only

  The crawl's shared state sits behind one coarse mutex; fetches and HTML
  extraction run outside it. A flush rewrites every table wholesale, so a
  reader always sees either none or all of a document's postings.
*/
