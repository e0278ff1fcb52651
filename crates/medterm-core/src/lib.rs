pub mod csv;
pub mod error;
pub mod record;
pub mod similarity;
pub mod store;

pub use error::{LoadStatus, StoreError};
pub use record::{TermRecord, VersionEntry};
pub use store::{ImportSummary, TermStore};
