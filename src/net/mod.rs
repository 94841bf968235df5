//! Networking modules for the `/auth/*` REST surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves bytes, `interceptors` attach the bearer token and react
//! to expired sessions, `http` assembles the pipeline, `api` names the three
//! endpoints, and `types`/`error` define the wire schema and failure shapes.

pub mod api;
pub mod error;
pub mod http;
pub mod interceptors;
pub mod transport;
pub mod types;
