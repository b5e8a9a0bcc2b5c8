pub mod indexer;
pub mod naming;
pub mod scanner;

pub use indexer::{IndexReport, ProjectIndexer};
pub use scanner::{CollectionScanner, walk_files};
