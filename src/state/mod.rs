//! Client-side session state.
//!
//! DESIGN
//! ======
//! `query` is the cache every remote read and write goes through, `session`
//! is the coordinator built once at start-up and handed to the router and
//! pages, and `auth` is the plain snapshot the view layer renders from.

pub mod auth;
pub mod query;
pub mod session;
