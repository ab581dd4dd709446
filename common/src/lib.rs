//! Shared domain model for the academy back office.
//!
//! Compiled natively for the `backend` service and to WebAssembly for the
//! `frontend`, so nothing in here touches the filesystem, the network or
//! the browser.

pub mod error;
pub mod jobs;
pub mod model;
pub mod requests;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
