//! Browser helpers shared by the components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Isolates `web-sys` calls so components stay buildable without the `csr`
//! feature.

pub mod alert;
