pub mod encoding;
pub mod layout;
pub mod snapshot;
