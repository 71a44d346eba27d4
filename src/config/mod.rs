//! Configuration
//!
//! Loads the optional YAML file, merges command-line overrides, and
//! validates the result into settings for the countdown engine.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoaderOptions, Overrides};
pub use schema::*;
pub use validation::{ValidationResult, Validator, parse_target};
