//! Concurrency test suite
//!
//! Runs the scheduler tests under `tests/concurrency/`.

mod common;
mod concurrency;
