//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_execution_api;

pub use http_execution_api::{ExecutionApiSettings, HttpExecutionApi, RetrySettings};
