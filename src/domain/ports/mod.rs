//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - Worker: runs one analysis task and always yields a result
//! - ReasoningClient: the external synthesis service
//! - ReportStore: keeps finished run records

pub mod reasoner;
pub mod report_store;
pub mod worker;

pub use reasoner::{ReasoningClient, ReasoningRequest};
pub use report_store::{ReportSort, ReportStore};
pub use worker::Worker;
