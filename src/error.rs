//! Error handling for object data operations
//!
//! This module defines the error types used throughout the crate. It uses
//! thiserror for ergonomic error handling and keeps format, truncation and
//! bounds failures as distinct variants so callers can choose their own
//! recovery policy.

pub use crate::common::ObjDataError;
pub use crate::common::Result;
