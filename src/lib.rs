#![forbid(unsafe_code)]

//! @acp:module "restgen Library"
//! @acp:summary "Annotated TypeScript API classes to routed handlers and generated client services"
//! @acp:domain cli
//! @acp:layer api
//!
//! # restgen
//!
//! Turns one annotated TypeScript API class into two artifacts that agree
//! on every route:
//!
//! - **Runtime dispatcher**: binds a live [`dispatch::ApiObject`] to verb and
//!   path routes, coercing query and body values into arguments and wrapping
//!   results in the `{result}` / `{error}` envelope
//! - **Stub emitter**: parses the declaration file, follows type references
//!   across imports, and writes a client service class that calls those
//!   routes
//!
//! Both sides derive paths and verbs through [`conventions`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use restgen::{EmitSettings, StubEmitter};
//!
//! fn main() -> restgen::Result<()> {
//!     let emitter = StubEmitter::new(EmitSettings::default());
//!     emitter.generate_to_file(Path::new("src/api.ts"), Path::new("client/api.service.ts"))?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod conventions;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod parse;
pub mod registry;
pub mod resolve;

// Re-exports
pub use config::Config;
pub use conventions::{endpoint_path, kebab_case, verb_of, Envelope, Verb};
pub use dispatch::{
    ApiObject, Args, BoundApi, DispatchRequest, DispatchResponse, Dispatcher, HostRouter,
    MethodSignature, Route,
};
pub use emit::{ClientFlavor, EmitSettings, GeneratedClient, StubEmitter};
pub use error::{RestgenError, Result};
pub use parse::{Declaration, SourceFile, SourceParser};
pub use registry::{DeclarationId, ParamType, Registry};
pub use resolve::{find_api_declaration, DeclarationResolver, SourceLoader};
