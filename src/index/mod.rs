pub mod forward;
pub mod indexer;
pub mod inverted;
pub mod posting;
