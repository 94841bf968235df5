//! Client-side route table and the guard consulted before every transition.

pub mod guard;
pub mod routes;
