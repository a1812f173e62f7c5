//! Compile-time embedded snippet templates.
//!
//! Each constant loads a template file from `templates/` via [`include_str!`]. The paths
//! are relative to this source file (`crates/ff-sandbox-core/src/templates/embedded.rs`).
//!
//! ## Adding a new template
//!
//! 1. Place the template file under `templates/<area>/<operation>.tmpl`
//! 2. Add a `pub const` here with `include_str!("../../../../templates/<path>")`
//! 3. Register it with its parameter contract in [`super::registry`]
//!
//! ## Warning
//!
//! Do NOT modify template files without checking that every `{{field}}` they reference
//! is still declared in the operation's contract. The registry refuses to load otherwise.

// -------------------------------------------------------
// Token templates (`/api/tokens/template/...`)
// -------------------------------------------------------

pub const POOLS: &str = include_str!("../../../../templates/tokens/pools.tmpl");
pub const MINT: &str = include_str!("../../../../templates/tokens/mint.tmpl");
pub const BURN: &str = include_str!("../../../../templates/tokens/burn.tmpl");
pub const TRANSFER: &str = include_str!("../../../../templates/tokens/transfer.tmpl");

// -------------------------------------------------------
// Messaging templates (`/api/simple/template/...`)
// -------------------------------------------------------

pub const BROADCAST: &str = include_str!("../../../../templates/simple/broadcast.tmpl");
pub const PRIVATE: &str = include_str!("../../../../templates/simple/private.tmpl");
