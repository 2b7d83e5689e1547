//! CLI command implementations.

pub mod bands;
pub mod common;
pub mod live;
pub mod profiles;
pub mod simulate;
pub mod validate;
