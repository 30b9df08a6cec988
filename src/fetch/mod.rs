pub mod client;
pub mod extract;
