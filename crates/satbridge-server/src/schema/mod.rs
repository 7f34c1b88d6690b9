//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for one endpoint.
//! Field names are camelCase on the wire to match the web client.

pub mod health;
pub mod solve;
