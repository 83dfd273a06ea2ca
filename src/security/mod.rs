//! Security utilities and validation functions.
//!
//! Archive member names and category names come from evidence and plugin
//! definitions, so they are sanitized before they become local paths.

pub mod path_validator;

pub use path_validator::{safe_relative_path, sanitize_filename, validate_output_path};
