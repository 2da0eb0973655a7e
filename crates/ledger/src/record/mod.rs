pub mod entities;
pub mod global;
pub mod interfaces;
pub mod sqlite;

pub use global::*;
pub use interfaces::{
    BranchRepository, RateRepository, RecordError, SubmissionQuery, SubmissionRepository,
};
pub use sqlite::SqliteStore;
