//! Browser-environment seams shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Token persistence, page navigation and wall-clock time are the only browser
//! globals the session logic touches. Each sits behind a small trait so the
//! networking, cache and guard code runs unchanged in native tests.

pub mod clock;
pub mod navigation;
pub mod storage;
