//! Structured error handling for envelope API calls

pub mod codes;
pub mod failure;

pub use failure::{ApiResult, Error};
