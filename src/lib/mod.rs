//! Environment file checking library.
//!
//! This library compares `.env`-style definition files against their example
//! templates, reports missing keys, and creates or updates a local file from a
//! template. It can also scan arbitrary text for tokens that look like
//! environment variable names.
//!
//! # Features
//!
//! - **Discovery**: finds templates and instances in a directory tree
//! - **Diffing**: lists keys a template defines but an instance lacks
//! - **Append-only updates**: existing lines are never rewritten or reordered
//! - **Optional tracing**: Detailed logging when the `tracing` feature is enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use envcheck::write;
//!
//! let report = write::update(".env", ".env.example").unwrap();
//! println!("{report}");
//! ```

pub mod diff;
pub mod discover;
pub mod list;
pub mod options;
pub mod parse;
pub mod scan;
pub mod write;

pub use options::Options;
