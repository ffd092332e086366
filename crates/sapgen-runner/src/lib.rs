//! Generator invocation for the SAP endpoint generator service.
//!
//! The actual code generation happens in an external CLI. This crate stages
//! the caller's config files, runs the CLI as a subprocess with the provider
//! API key in its environment, and turns whatever it did into a
//! [`GenerationResult`](sapgen_core::GenerationResult).
//!
//! # Flow
//!
//! 1. Check the API key is available (fail before anything is spawned)
//! 2. Take the customer's lock
//! 3. Stage config files into an invocation-scoped scratch directory
//! 4. Run `<program> quote --customer ...` in its own process group with a
//!    wall-clock timeout, then kill whatever is left of the group
//! 5. Extract the session identifier from stdout
//! 6. Scan the customer's output directory and commit the store
//!
//! A nonzero exit code is returned as data; steps 5 and 6 run regardless.
//! Steps 2 to 6 run on their own task, so dropping the caller's future does
//! not cancel a generation that has started.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod command;
mod invoker;
mod process;
mod session;
mod staging;
mod task;

pub use command::GeneratorCommand;
pub use invoker::GenerationInvoker;
pub use session::{MarkerExtractor, SessionExtractor};
pub use staging::StagedConfig;
pub use task::run_blocking;
