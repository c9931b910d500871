//! Ownership of orchestrated gateway instances.
//!
//! An [`InstanceLease`] is created once an orchestrator has started an
//! instance and is the only thing able to kill it. Release happens at most
//! once, either through [`InstanceLease::release`] or, as a fallback, when
//! the lease is dropped. The drop path blocks until the kill call returns.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use sgw_runtime::{InstanceHandle, Orchestrator, StartRequest};
use tokio::runtime::RuntimeFlavor;
use tracing::{debug, info, warn};

use crate::client::ClientOptions;
use crate::endpoint::DEFAULT_HOST;
use crate::error::Result;

/// Where a gateway facade is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
	Uninitialized,
	Starting,
	Running,
	Stopped,
}

impl LifecycleState {
	pub fn as_str(self) -> &'static str {
		match self {
			LifecycleState::Uninitialized => "uninitialized",
			LifecycleState::Starting => "starting",
			LifecycleState::Running => "running",
			LifecycleState::Stopped => "stopped",
		}
	}
}

impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parameters for launching an orchestrated gateway.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
	/// Orchestrator-side identifier of the instance, e.g. the test name.
	pub path: String,
	/// Configuration text handed to the orchestrator.
	pub config: Option<String>,
	pub host: String,
	/// Used when the configuration has no `interface` key.
	pub public_port: Option<u16>,
	/// Used when the configuration has no `adminInterface` key.
	pub admin_port: Option<u16>,
	pub client: ClientOptions,
}

impl LaunchOptions {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			config: None,
			host: DEFAULT_HOST.to_string(),
			public_port: None,
			admin_port: None,
			client: ClientOptions::default(),
		}
	}

	pub fn with_config(mut self, config: impl Into<String>) -> Self {
		self.config = Some(config.into());
		self
	}

	pub fn with_host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();
		self
	}

	pub fn with_ports(mut self, public_port: u16, admin_port: u16) -> Self {
		self.public_port = Some(public_port);
		self.admin_port = Some(admin_port);
		self
	}

	pub fn with_client_options(mut self, options: ClientOptions) -> Self {
		self.client = options;
		self
	}

	pub(crate) fn start_request(&self) -> StartRequest {
		let request = StartRequest::new(self.path.clone());
		match &self.config {
			Some(config) => request.with_config(config.clone()),
			None => request,
		}
	}
}

/// Exclusive right to kill one started instance.
pub struct InstanceLease {
	orchestrator: Arc<dyn Orchestrator>,
	handle: Mutex<Option<InstanceHandle>>,
	id: String,
}

impl InstanceLease {
	/// Starts an instance. A start failure leaves nothing to release.
	pub async fn acquire(orchestrator: Arc<dyn Orchestrator>, request: &StartRequest) -> Result<Self> {
		debug!(target = "sgw.lifecycle", path = %request.path, state = %LifecycleState::Starting, "starting instance");
		let handle = orchestrator.start(request).await?;
		info!(target = "sgw.lifecycle", path = %request.path, %handle, "instance started");
		Ok(Self::new(orchestrator, handle))
	}

	pub fn new(orchestrator: Arc<dyn Orchestrator>, handle: InstanceHandle) -> Self {
		Self {
			orchestrator,
			id: handle.id.clone(),
			handle: Mutex::new(Some(handle)),
		}
	}

	/// Handle of the leased instance, `None` once released.
	pub fn handle(&self) -> Option<InstanceHandle> {
		self.handle.lock().clone()
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn is_released(&self) -> bool {
		self.handle.lock().is_none()
	}

	/// Kills the instance. Later calls do nothing; kill failures are logged.
	pub async fn release(&self) {
		let taken = self.handle.lock().take();
		let Some(handle) = taken else {
			debug!(target = "sgw.lifecycle", handle = %self.id, "instance already released");
			return;
		};
		kill(self.orchestrator.as_ref(), &handle).await;
	}
}

async fn kill(orchestrator: &dyn Orchestrator, handle: &InstanceHandle) {
	match orchestrator.kill(handle).await {
		Ok(()) => info!(target = "sgw.lifecycle", %handle, state = %LifecycleState::Stopped, "instance released"),
		Err(e) => warn!(target = "sgw.lifecycle", %handle, error = %e, "failed to kill instance"),
	}
}

impl Drop for InstanceLease {
	fn drop(&mut self) {
		let Some(handle) = self.handle.get_mut().take() else {
			return;
		};
		debug!(target = "sgw.lifecycle", %handle, "releasing instance on drop");
		let orchestrator = Arc::clone(&self.orchestrator);

		// The kill must finish before drop returns: a spawned task would be
		// cancelled with the runtime that owns it.
		match tokio::runtime::Handle::try_current() {
			Ok(runtime) if runtime.runtime_flavor() == RuntimeFlavor::MultiThread => {
				tokio::task::block_in_place(|| runtime.block_on(kill(orchestrator.as_ref(), &handle)));
			}
			_ => kill_on_release_thread(orchestrator, handle),
		}
	}
}

/// Runs the kill on a dedicated thread with its own runtime and joins it.
///
/// Used when the dropping thread cannot block on its runtime (current-thread
/// flavor) or has no runtime at all.
fn kill_on_release_thread(orchestrator: Arc<dyn Orchestrator>, handle: InstanceHandle) {
	let id = handle.id.clone();
	let spawned = std::thread::Builder::new().name("sgw-release".to_string()).spawn(move || {
		match tokio::runtime::Builder::new_current_thread().enable_all().build() {
			Ok(runtime) => runtime.block_on(kill(orchestrator.as_ref(), &handle)),
			Err(e) => warn!(target = "sgw.lifecycle", %handle, error = %e, "no runtime to release instance"),
		}
	});
	match spawned {
		Ok(thread) => {
			if thread.join().is_err() {
				warn!(target = "sgw.lifecycle", handle = %id, "release thread panicked");
			}
		}
		Err(e) => warn!(target = "sgw.lifecycle", handle = %id, error = %e, "failed to spawn release thread"),
	}
}

impl fmt::Debug for InstanceLease {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstanceLease")
			.field("id", &self.id)
			.field("released", &self.is_released())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use async_trait::async_trait;
	use sgw_runtime::RuntimeError;

	use super::*;

	/// Orchestrator double counting calls.
	#[derive(Default)]
	pub(crate) struct CountingOrchestrator {
		pub starts: AtomicUsize,
		pub kills: AtomicUsize,
		pub echo: Option<String>,
		pub fail_start: bool,
		pub fail_kill: bool,
	}

	impl CountingOrchestrator {
		pub fn echoing(config: &str) -> Self {
			Self {
				echo: Some(config.to_string()),
				..Self::default()
			}
		}

		pub fn starts(&self) -> usize {
			self.starts.load(Ordering::SeqCst)
		}

		pub fn kills(&self) -> usize {
			self.kills.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl Orchestrator for CountingOrchestrator {
		async fn start(&self, request: &StartRequest) -> sgw_runtime::Result<InstanceHandle> {
			let n = self.starts.fetch_add(1, Ordering::SeqCst);
			if self.fail_start {
				return Err(RuntimeError::Start {
					path: request.path.clone(),
					message: "refused".to_string(),
				});
			}
			Ok(InstanceHandle::new(format!("sg-{n}")).with_config(self.echo.clone()))
		}

		async fn kill(&self, handle: &InstanceHandle) -> sgw_runtime::Result<()> {
			self.kills.fetch_add(1, Ordering::SeqCst);
			if self.fail_kill {
				return Err(RuntimeError::Kill {
					handle: handle.id.clone(),
					message: "gone".to_string(),
				});
			}
			Ok(())
		}
	}

	#[tokio::test]
	async fn release_kills_exactly_once() {
		let orchestrator = Arc::new(CountingOrchestrator::default());
		let lease = InstanceLease::acquire(orchestrator.clone(), &StartRequest::new("t")).await.unwrap();
		assert_eq!(lease.id(), "sg-0");

		lease.release().await;
		lease.release().await;
		assert!(lease.is_released());
		assert_eq!(orchestrator.kills(), 1);

		drop(lease);
		tokio::task::yield_now().await;
		assert_eq!(orchestrator.kills(), 1);
	}

	#[tokio::test]
	async fn failed_kill_is_swallowed() {
		let orchestrator = Arc::new(CountingOrchestrator {
			fail_kill: true,
			..CountingOrchestrator::default()
		});
		let lease = InstanceLease::acquire(orchestrator.clone(), &StartRequest::new("t")).await.unwrap();
		lease.release().await;
		assert!(lease.is_released());
		assert_eq!(orchestrator.kills(), 1);
	}

	#[tokio::test]
	async fn drop_releases_on_current_thread_runtime() {
		let orchestrator = Arc::new(CountingOrchestrator::default());
		let lease = InstanceLease::acquire(orchestrator.clone(), &StartRequest::new("t")).await.unwrap();
		drop(lease);
		assert_eq!(orchestrator.kills(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn drop_releases_on_multi_thread_runtime() {
		let orchestrator = Arc::new(CountingOrchestrator::default());
		let lease = InstanceLease::acquire(orchestrator.clone(), &StartRequest::new("t")).await.unwrap();
		drop(lease);
		assert_eq!(orchestrator.kills(), 1);
	}

	#[test]
	fn drop_without_runtime_still_releases() {
		let orchestrator = Arc::new(CountingOrchestrator::default());
		let lease = InstanceLease::new(orchestrator.clone(), InstanceHandle::new("sg-x"));
		drop(lease);
		assert_eq!(orchestrator.kills(), 1);
	}

	#[test]
	fn lease_left_at_end_of_runtime_is_released() {
		let orchestrator = Arc::new(CountingOrchestrator::default());
		let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
		runtime.block_on({
			let orchestrator = orchestrator.clone();
			async move {
				let _lease = InstanceLease::acquire(orchestrator, &StartRequest::new("t")).await.unwrap();
			}
		});
		drop(runtime);
		assert_eq!(orchestrator.kills(), 1);
	}

	#[tokio::test]
	async fn start_failure_yields_no_lease() {
		let orchestrator = Arc::new(CountingOrchestrator {
			fail_start: true,
			..CountingOrchestrator::default()
		});
		let err = InstanceLease::acquire(orchestrator.clone(), &StartRequest::new("t")).await.unwrap_err();
		assert!(err.is_construction());
		assert_eq!(orchestrator.kills(), 0);
	}

	#[test]
	fn launch_options_build_start_request() {
		let options = LaunchOptions::new("suite/case").with_config("{}").with_ports(1, 2);
		let request = options.start_request();
		assert_eq!(request.path, "suite/case");
		assert_eq!(request.config.as_deref(), Some("{}"));
		assert_eq!(options.host, "localhost");
	}
}
