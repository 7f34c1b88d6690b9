//! HTTP/JSON API server fronting an external SAT/LTL solver.
//!
//! Accepts a formula over HTTP, runs it through the
//! [`satbridge_solver`] pipeline and answers with a verdict. This crate
//! contains the server framework, API schema types, error handling,
//! configuration, and route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
