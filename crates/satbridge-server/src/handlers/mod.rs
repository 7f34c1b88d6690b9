//! HTTP handler modules for the satbridge API.
//!
//! Each sub-module implements thin handlers that parse requests, delegate to
//! [`SolveService`](crate::service::SolveService), and return JSON responses.
//! No business logic lives in handlers.

pub mod health;
pub mod solve;
