//! Orchestrator that runs gateway executables on the local machine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{Result, RuntimeError};
use crate::orchestrator::{InstanceHandle, Orchestrator, StartRequest};
use crate::process::{pid_is_alive, wait_for_listener};

const CONFIG_FILE_NAME: &str = "sync_gateway.json";
const EXIT_POLL_ATTEMPTS: u32 = 250;
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// [`Orchestrator`] that spawns one child process per started instance.
///
/// The configuration text is written to `<work_dir>/<path>/sync_gateway.json`
/// and passed as the last argument. Handles are process ids.
pub struct LocalProcessOrchestrator {
	executable: PathBuf,
	args: Vec<String>,
	work_dir: PathBuf,
	ready_port: Option<u16>,
	ready_attempts: u32,
	ready_interval: Duration,
	children: Mutex<HashMap<String, Child>>,
}

impl LocalProcessOrchestrator {
	pub fn new(executable: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
		Self {
			executable: executable.into(),
			args: Vec::new(),
			work_dir: work_dir.into(),
			ready_port: None,
			ready_attempts: 50,
			ready_interval: Duration::from_millis(200),
			children: Mutex::new(HashMap::new()),
		}
	}

	/// Arguments placed before the config file path.
	pub fn with_args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.args = args.into_iter().map(Into::into).collect();
		self
	}

	/// Waits for `port` to accept connections before `start` returns.
	pub fn with_ready_port(mut self, port: u16) -> Self {
		self.ready_port = Some(port);
		self
	}

	pub fn with_ready_timeout(mut self, attempts: u32, interval: Duration) -> Self {
		self.ready_attempts = attempts;
		self.ready_interval = interval;
		self
	}

	/// Number of instances started and not yet killed.
	pub fn running(&self) -> usize {
		self.children.lock().len()
	}

	fn instance_dir(&self, path: &str) -> PathBuf {
		let slot: String = path
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
			.collect();
		self.work_dir.join(slot)
	}

	async fn write_config(&self, dir: &Path, config: &str) -> Result<PathBuf> {
		tokio::fs::create_dir_all(dir).await?;
		let path = dir.join(CONFIG_FILE_NAME);
		tokio::fs::write(&path, config).await?;
		Ok(path)
	}
}

#[async_trait]
impl Orchestrator for LocalProcessOrchestrator {
	async fn start(&self, request: &StartRequest) -> Result<InstanceHandle> {
		let start_error = |message: String| RuntimeError::Start {
			path: request.path.clone(),
			message,
		};

		let mut cmd = Command::new(&self.executable);
		cmd.args(&self.args);
		if let Some(config) = &request.config {
			let config_path = self.write_config(&self.instance_dir(&request.path), config).await?;
			cmd.arg(config_path);
		}
		cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null()).kill_on_drop(true);

		let mut child = cmd
			.spawn()
			.map_err(|e| start_error(format!("failed to spawn {}: {}", self.executable.display(), e)))?;
		let pid = child.id().ok_or_else(|| start_error("process exited before reporting a pid".to_string()))?;

		if let Some(port) = self.ready_port {
			if !wait_for_listener(port, self.ready_attempts, self.ready_interval).await {
				if let Err(e) = terminate(&mut child).await {
					warn!(target = "sgw.orchestrator", pid, error = %e, "failed to kill gateway that never became ready");
				}
				return Err(start_error(format!("gateway never started listening on port {port}")));
			}
		}

		if let Ok(Some(status)) = child.try_wait() {
			return Err(start_error(format!("gateway exited during startup (status: {status})")));
		}

		let handle = InstanceHandle::new(pid.to_string()).with_config(request.config.clone());
		info!(target = "sgw.orchestrator", path = %request.path, pid, "local gateway started");
		self.children.lock().insert(handle.id.clone(), child);
		Ok(handle)
	}

	async fn kill(&self, handle: &InstanceHandle) -> Result<()> {
		let child = self.children.lock().remove(&handle.id);
		let Some(mut child) = child else {
			return Err(RuntimeError::Kill {
				handle: handle.id.clone(),
				message: "no such instance".to_string(),
			});
		};

		if child.id().is_none_or(|pid| !pid_is_alive(pid)) {
			debug!(target = "sgw.orchestrator", %handle, "gateway already exited");
			return Ok(());
		}

		terminate(&mut child).await.map_err(|e| RuntimeError::Kill {
			handle: handle.id.clone(),
			message: e.to_string(),
		})?;
		info!(target = "sgw.orchestrator", %handle, "local gateway killed");
		Ok(())
	}
}

/// Kills `child` and reaps it, polling `try_wait` on the caller's timer so it
/// completes on a runtime other than the one that spawned the child.
async fn terminate(child: &mut Child) -> std::io::Result<()> {
	child.start_kill()?;
	for _ in 0..EXIT_POLL_ATTEMPTS {
		if child.try_wait()?.is_some() {
			return Ok(());
		}
		tokio::time::sleep(EXIT_POLL_INTERVAL).await;
	}
	Err(std::io::Error::other("process still running after kill"))
}
