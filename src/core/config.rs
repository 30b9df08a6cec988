use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub seed: String,
    pub max_pages: usize,
    pub workers: usize,
    pub batch_size: usize,
    pub storage_path: PathBuf,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        CrawlerConfig {
            seed: String::new(),
            max_pages: 300,
            workers: 40,                            // worker pool size
            batch_size: 10,                         // pages per persistence flush
            storage_path: PathBuf::from("./data"),
            fetch_timeout: Duration::from_secs(30),
            user_agent: format!("spindex/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub db_path: PathBuf,
    pub max_results: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        RetrieverConfig {
            db_path: PathBuf::from("./data"),
            max_results: 50,
        }
    }
}
