use std::path::{Path, PathBuf};

use swapdesk_core::config::{config_dir_at, Config};

pub const DAEMON_SOCKET: &str = "daemon.sock";

pub fn socket_path(home: &Path) -> PathBuf {
    config_dir_at(home).join(DAEMON_SOCKET)
}

/// Socket to talk to: the configured override, else the default location.
pub fn resolve_socket(home: &Path, config: &Config) -> PathBuf {
    config
        .socket
        .clone()
        .unwrap_or_else(|| socket_path(home))
}
