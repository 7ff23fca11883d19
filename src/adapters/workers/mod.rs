//! Worker adapter implementations.

pub mod in_process;
pub mod mock;
pub mod registry;
pub mod subprocess;

pub use in_process::InProcessWorker;
pub use mock::{MockResponse, MockWorker};
pub use registry::WorkerRegistry;
pub use subprocess::{SubprocessConfig, SubprocessWorker};
