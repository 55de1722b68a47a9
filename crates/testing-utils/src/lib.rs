//! # Signage Testing Utils
//!
//! Test doubles for the ports widgets depend on, plus builders and polling
//! helpers shared by every crate's tests.
//!
//! ```toml
//! [dev-dependencies]
//! signage-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
