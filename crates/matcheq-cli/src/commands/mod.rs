//! CLI command implementations.

pub mod apply;
pub mod common;
pub mod equalize;
pub mod estimate;
pub mod info;
pub mod run;
