//! Test-automation client for Couchbase Sync Gateway.
//!
//! A [`SyncGateway`] bundles two REST clients, one for the public interface
//! and one for the admin interface, that share a session cookie. It is either
//! attached to a gateway that is already running ([`SyncGateway::connect`])
//! or launched through an [`Orchestrator`], in which case the facade owns the
//! instance and kills it on [`SyncGateway::shutdown`] or drop.
//!
//! ```ignore
//! use std::sync::Arc;
//! use sgw::prelude::*;
//! use sgw::{HttpOrchestrator, LaunchOptions, SyncGateway};
//!
//! let orchestrator = Arc::new(HttpOrchestrator::new("http://127.0.0.1:5000")?);
//! let gateway = SyncGateway::launch(orchestrator, LaunchOptions::new("suite/case").with_config(config)).await?;
//!
//! gateway.admin().put_document("db", "doc1", &json!({"n": 1}), None, true).await?;
//! gateway.login("db", "alice", "password").await?;
//! let doc = gateway.public().get_document("db", "doc1", &Default::default()).await?;
//!
//! gateway.shutdown().await;
//! ```
//!
//! Endpoints are derived from the gateway's configuration text by
//! [`endpoint::resolve`], which scans for a handful of keys rather than
//! parsing the text.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod replication;
pub mod session;

pub use client::{
	AdminApi, AdminClient, AllDocsQuery, BulkGetOptions, ByteStream, ClientOptions, ClientPair, CreatedSession, GetDocumentOptions, PublicApi,
	PublicClient, RestClient,
};
pub use endpoint::{DEFAULT_ADMIN_PORT, DEFAULT_PUBLIC_PORT, EndpointConfig, EndpointResolution, Interface, ResolvedPort, Scheme, resolve};
pub use error::{Error, Result};
pub use gateway::SyncGateway;
pub use lifecycle::{InstanceLease, LaunchOptions, LifecycleState};
pub use replication::replication_url;
pub use session::SessionState;
pub use sgw_protocol as protocol;
pub use sgw_runtime::{HttpOrchestrator, InstanceHandle, LocalProcessOrchestrator, Orchestrator, RuntimeError, StartRequest};

/// Operation traits, for `use sgw::prelude::*`.
pub mod prelude {
	pub use crate::client::{AdminApi, PublicApi};
}
