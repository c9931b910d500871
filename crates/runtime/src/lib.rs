//! Sync Gateway instance orchestration.
//!
//! Integration tests do not start gateways themselves; they ask an
//! orchestration collaborator to do it and to tear the instance down again.
//! This crate defines that seam ([`Orchestrator`]) and ships two
//! implementations:
//!
//! * [`HttpOrchestrator`] - talks to a remote test-server process over HTTP.
//! * [`LocalProcessOrchestrator`] - spawns a `sync_gateway` executable on this
//!   machine.
//!
//! Callers construct one orchestrator per process and pass it explicitly (as an
//! `Arc<dyn Orchestrator>`) to every gateway they launch.

pub mod error;
pub mod http;
pub mod local;
pub mod orchestrator;
pub mod process;

pub use error::{Result, RuntimeError};
pub use http::HttpOrchestrator;
pub use local::LocalProcessOrchestrator;
pub use orchestrator::{InstanceHandle, Orchestrator, StartRequest};
