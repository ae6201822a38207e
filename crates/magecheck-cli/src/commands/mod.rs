//! CLI command implementations.

pub mod modules;
pub mod split;
pub mod validate;
