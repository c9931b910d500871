//! Process and port checks used while supervising local gateways.

use std::time::Duration;

/// Returns `true` when a process with `pid` still exists.
pub fn pid_is_alive(pid: u32) -> bool {
	if pid == 0 {
		return false;
	}

	#[cfg(unix)]
	{
		if std::path::Path::new("/proc").join(pid.to_string()).exists() {
			return true;
		}

		std::process::Command::new("kill")
			.arg("-0")
			.arg(pid.to_string())
			.status()
			.map(|status| status.success())
			.unwrap_or(false)
	}

	#[cfg(not(unix))]
	{
		pid == std::process::id()
	}
}

/// Returns `true` when nothing is listening on `port` on localhost.
pub fn port_available(port: u16) -> bool {
	std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Polls until something binds `port`, or gives up after `attempts` tries.
pub async fn wait_for_listener(port: u16, attempts: u32, interval: Duration) -> bool {
	for _ in 0..attempts {
		if !port_available(port) {
			return true;
		}
		tokio::time::sleep(interval).await;
	}
	!port_available(port)
}
