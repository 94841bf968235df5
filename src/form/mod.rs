//! Form state and validation shared by the login and register pages.
//!
//! DESIGN
//! ======
//! `schemas` declares the field rules with `validator` derives, `validation`
//! turns a validation pass into a per-field message map with touched/dirty
//! tracking, and `state` wraps both around a submit operation with loading
//! and server-error bookkeeping.

pub mod schemas;
pub mod state;
pub mod validation;
