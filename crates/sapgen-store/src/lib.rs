//! Output store for generated SAP endpoint code.
//!
//! The store is a directory tree with one subdirectory per customer. It is
//! passed around as an injected handle implementing [`OutputStore`], never as
//! a global, so tests can point it at a temporary directory.
//!
//! # Components
//!
//! - [`OutputStore`] / [`VolumeStore`]: path resolution and commit
//! - [`scan`]: listing a customer's files relative to the store root
//! - [`build_archive`]: zip archive of a customer's output
//! - [`list_customers`]: customer directories, most recently modified first
//! - [`CustomerLocks`]: per-customer mutual exclusion for generations
//!
//! # Examples
//!
//! ```
//! use sapgen_core::CustomerName;
//! use sapgen_store::{OutputStore, VolumeStore, list_customers};
//!
//! # let temp = tempfile::TempDir::new().unwrap();
//! let store = VolumeStore::new(temp.path());
//! let acme = CustomerName::new("acme").unwrap();
//!
//! std::fs::create_dir_all(store.customer_dir(&acme)).unwrap();
//! std::fs::write(store.customer_dir(&acme).join("main.ts"), "export {}").unwrap();
//! store.commit(&acme).unwrap();
//!
//! let customers = list_customers(&store).unwrap();
//! assert_eq!(customers[0].name, "acme");
//! assert_eq!(customers[0].file_count, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod archive;
mod lister;
mod locks;
pub mod scan;
mod store;

pub use archive::build_archive;
pub use lister::list_customers;
pub use locks::{CustomerGuard, CustomerLocks};
pub use store::{OutputStore, VolumeStore};
