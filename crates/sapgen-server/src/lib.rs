//! HTTP and MCP facades for the SAP endpoint generator.
//!
//! Both facades expose the same three operations on top of [`state::AppState`]:
//!
//! 1. **generate** - Run the external generator for one customer
//! 2. **list customers** - Scan the output store
//! 3. **download** - Zip a customer's generated code
//!
//! The HTTP facade ([`http::router`]) serves JSON and zip bytes; the MCP facade
//! ([`rpc::GeneratorService`]) serves the same operations as tools over stdio,
//! with archives base64-encoded.
//!
//! # Examples
//!
//! ```no_run
//! use sapgen_core::ServiceConfig;
//! use sapgen_server::{http, state::AppState};
//! use sapgen_store::VolumeStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let store = Arc::new(VolumeStore::new(&config.store_root));
//! let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
//!
//! axum::serve(listener, http::router(AppState::new(config, store))).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod http;
pub mod rpc;
pub mod state;
pub mod types;
