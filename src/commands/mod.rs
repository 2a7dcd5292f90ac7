//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! CLI command implementations
//!
//! Each command is in its own submodule and exposes an `execute_*` function
//! taking its `*Options` plus the loaded [`crate::Config`].

pub mod generate;
pub mod routes;

pub use generate::{execute_generate, GenerateOptions};
pub use routes::{execute_routes, RoutesOptions};
