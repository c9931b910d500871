//! The gateway facade tests hold on to.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sgw_protocol::SessionCredentials;
use sgw_runtime::{InstanceHandle, Orchestrator};
use tracing::{debug, info, warn};
use url::Url;

use crate::client::{AdminClient, ClientOptions, ClientPair, CreatedSession, PublicApi, PublicClient};
use crate::endpoint::{EndpointConfig, resolve};
use crate::error::Result;
use crate::lifecycle::{InstanceLease, LaunchOptions, LifecycleState};
use crate::replication::replication_url;
use crate::session::{SessionState, basic_authorization};

/// One Sync Gateway: its endpoints, a public/admin client pair sharing a
/// session, and, when launched through an orchestrator, the instance itself.
///
/// A launched gateway is killed by [`SyncGateway::shutdown`], or when the
/// facade is dropped if that never happened.
#[derive(Debug)]
pub struct SyncGateway {
	endpoints: EndpointConfig,
	clients: ClientPair,
	session: Arc<SessionState>,
	lease: Option<InstanceLease>,
	stopped: AtomicBool,
}

impl SyncGateway {
	/// Attaches to a gateway that is already running. Nothing is killed on shutdown.
	pub fn connect(endpoints: EndpointConfig, options: &ClientOptions) -> Result<Self> {
		let session = Arc::new(SessionState::new());
		let clients = ClientPair::bind(&endpoints, options, session.clone())?;
		info!(target = "sgw.gateway", public = %endpoints.public_port(), admin = %endpoints.admin_port(), host = endpoints.host(), "gateway attached");
		Ok(Self {
			endpoints,
			clients,
			session,
			lease: None,
			stopped: AtomicBool::new(false),
		})
	}

	/// Resolves endpoints from configuration text and attaches to them.
	pub fn from_config_text(config_text: &str, host: &str, options: &ClientOptions) -> Result<Self> {
		let endpoints = resolve(Some(config_text), None, None, host).validate()?;
		Self::connect(endpoints, options)
	}

	/// Starts an instance through `orchestrator` and binds a facade to it.
	///
	/// Endpoints come from the configuration the orchestrator reports, falling
	/// back to the one supplied. If anything fails after the instance started,
	/// it is killed once before the error is returned.
	pub async fn launch(orchestrator: Arc<dyn Orchestrator>, options: LaunchOptions) -> Result<Self> {
		debug!(target = "sgw.gateway", path = %options.path, state = %LifecycleState::Uninitialized, "launching gateway");
		let lease = InstanceLease::acquire(orchestrator, &options.start_request()).await?;

		let echoed = lease.handle().and_then(|handle| handle.config);
		let config = echoed.as_deref().or(options.config.as_deref());
		let bound = resolve(config, options.public_port, options.admin_port, &options.host)
			.validate()
			.and_then(|endpoints| Self::connect(endpoints, &options.client));

		match bound {
			Ok(mut gateway) => {
				info!(target = "sgw.gateway", handle = lease.id(), state = %LifecycleState::Running, "gateway launched");
				gateway.lease = Some(lease);
				Ok(gateway)
			}
			Err(e) => {
				warn!(target = "sgw.gateway", handle = lease.id(), error = %e, "gateway construction failed; releasing instance");
				lease.release().await;
				Err(e)
			}
		}
	}

	pub fn public(&self) -> &PublicClient {
		&self.clients.public
	}

	pub fn admin(&self) -> &AdminClient {
		&self.clients.admin
	}

	pub fn endpoints(&self) -> &EndpointConfig {
		&self.endpoints
	}

	pub fn public_url(&self) -> &Url {
		self.clients.public.rest().base_url()
	}

	pub fn admin_url(&self) -> &Url {
		self.clients.admin.rest().base_url()
	}

	/// `blip`/`blips` URL for replicating `db` over the public interface.
	pub fn replication_url(&self, db: &str) -> Result<Url> {
		replication_url(self.public_url(), db)
	}

	/// Session token both clients currently send.
	pub fn session(&self) -> Option<String> {
		self.session.session()
	}

	pub fn set_session(&self, token: &str) {
		self.session.set_session(token);
	}

	pub fn clear_session(&self) {
		self.session.clear_session();
	}

	pub fn set_authorization(&self, value: Option<String>) {
		self.session.set_authorization(value);
	}

	pub fn set_basic_auth(&self, name: &str, password: &str) {
		self.session.set_authorization(Some(basic_authorization(name, password)));
	}

	/// Creates a session for `name` on the public interface and makes it current.
	pub async fn login(&self, db: &str, name: &str, password: &str) -> Result<CreatedSession> {
		let created = self.clients.public.post_session(db, &SessionCredentials::new(name, password)).await?;
		match &created.token {
			Some(token) => {
				self.session.set_session(token);
				debug!(target = "sgw.gateway", db, user = name, "session stored");
			}
			None => warn!(target = "sgw.gateway", db, user = name, "session created without a cookie"),
		}
		Ok(created)
	}

	/// `Running` until [`shutdown`](Self::shutdown), then `Stopped`.
	///
	/// A constructed facade is always at least `Running`; `Uninitialized` and
	/// `Starting` are only passed through inside [`launch`](Self::launch) and
	/// show up in its lifecycle logs.
	pub fn state(&self) -> LifecycleState {
		if self.stopped.load(Ordering::SeqCst) {
			LifecycleState::Stopped
		} else {
			LifecycleState::Running
		}
	}

	/// Handle of the launched instance, `None` when attached or already stopped.
	pub fn instance(&self) -> Option<InstanceHandle> {
		self.lease.as_ref().and_then(InstanceLease::handle)
	}

	/// Kills a launched instance. Idempotent; never fails.
	pub async fn shutdown(&self) {
		if self.stopped.swap(true, Ordering::SeqCst) {
			return;
		}
		if let Some(lease) = &self.lease {
			lease.release().await;
		}
		info!(target = "sgw.gateway", state = %LifecycleState::Stopped, "gateway stopped");
	}
}
