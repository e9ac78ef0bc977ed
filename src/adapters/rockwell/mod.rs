mod protocol;
mod config;
mod backend;
pub mod parser;

// Public surface: analyzer, its configuration and the ladder verbs it recognizes.
pub use protocol::{CoilVerb, ContactVerb};
pub use config::{L5kConfig, DEFAULT_BLOCK_TYPES};
pub use backend::L5kAnalyzer;
