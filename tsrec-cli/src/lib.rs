//! Library target for the `tsrec` package.
//!
//! The primary deliverable of this package is the `tsrec` CLI binary
//! (`src/main.rs`); its building blocks live here so they can be tested.

pub mod cli;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod signal;
pub mod utils;

#[doc(hidden)]
pub use tsrec_engine;
