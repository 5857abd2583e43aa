//! Execution pipeline
//!
//! Turns one host item into one output record:
//!
//! ```text
//! params -> submit -> poll -> retrieve -> assemble
//! ```
//!
//! ## Key Components
//!
//! - [`Pipeline`] - runs all items of a host, applying continue-on-fail
//! - [`ItemParams`] - typed per-item parameters
//! - [`poll_until_complete`] - interval/deadline poll loop over an injected [`Clock`]
//! - [`download_all`] - list and fetch every output file
//! - [`ExecutionReport`] - assembled result of one synchronous execution

pub mod assemble;
pub mod params;
pub mod poller;
pub mod retriever;
mod runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assemble::{ExecutionReport, binary_slot_names};
pub use params::{ExecuteParams, ItemParams, ItemRequest, Operation, WorkerTarget};
pub use poller::{Clock, ManualClock, PollSettings, TokioClock, poll_since, poll_until_complete};
pub use retriever::download_all;
pub use runner::Pipeline;
