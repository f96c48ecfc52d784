//! # hashkv Testkit
//!
//! Test utilities for hashkv.
//!
//! This crate provides:
//! - The `Person` domain used across the test suites, as a schema and as
//!   ready-made objects
//! - Converter and adapter helpers over that schema
//! - A reference resolver that records its calls
//! - Property-based generators for reference-free object graphs
//!
//! ## Usage
//!
//! ```
//! use hashkv_testkit::prelude::*;
//!
//! let converter = converter();
//! let record = converter.write(&rand()).unwrap();
//! assert_eq!(record.root_key().as_deref(), Some("persons:1"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod resolver;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::resolver::*;
}

pub use fixtures::*;
pub use generators::*;
pub use resolver::*;
