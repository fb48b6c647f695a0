//! Security Policy Module
//!
//! Permission checks for control requests.
//!
//! # Security Properties
//! - Deny by default: only the listed cases are permitted
//! - Decisions never mutate interceptor state

pub mod authz;

pub use authz::{authorize, Access};
