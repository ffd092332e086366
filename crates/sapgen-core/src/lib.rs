//! Core types, configuration, and errors for the SAP endpoint generator.
//!
//! This crate provides the foundational types shared by the store, the
//! generator runner, and the HTTP/RPC facades.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`CustomerName`, `SapVersion`, `SessionId`)
//! - Request/result models exchanged with callers (`GenerationRequest`,
//!   `GenerationResult`, `CustomerRecord`)
//! - A single error hierarchy with contextual information
//! - Service configuration with TOML loading and validation

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod command;
mod config;
mod error;
mod model;
mod types;

pub use command::validate_program;
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{Error, Result};
pub use model::{CustomerRecord, GenerationRequest, GenerationResult};
pub use types::{CustomerName, SapVersion, SessionId};
