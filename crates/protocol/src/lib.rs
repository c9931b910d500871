//! Wire types for the Sync Gateway REST API.
//!
//! This crate contains the serde-serializable request and response bodies
//! exchanged with a Sync Gateway over its public and admin HTTP interfaces.
//! These types represent the "protocol layer" - the shapes of data as they
//! appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Lenient: Fields the gateway may omit are `Option` or defaulted
//! * Stable: Changes only when the REST surface changes
//!
//! The client facade that sends and receives these types lives in `sgw-rs`.

pub mod database;
pub mod document;
pub mod oidc;
pub mod server;
pub mod session;

pub use database::*;
pub use document::*;
pub use oidc::*;
pub use server::*;
pub use session::*;
