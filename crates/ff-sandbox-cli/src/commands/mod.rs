//! CLI command implementations for ff-sandbox.
//!
//! Each module corresponds to a subcommand (`ff-sandbox <command>`).

pub mod check;
pub mod render;
pub mod serve;
pub mod show;
