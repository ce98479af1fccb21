//! Utility functions for code generation, input validation, and database errors.
//!
//! - [`code_generator`] - Short code generation and audit fingerprints
//! - [`url_validator`] - Syntactic checks for long URLs and custom aliases
//! - [`db_error`] - SQLx error classification

pub mod code_generator;
pub mod db_error;
pub mod url_validator;
