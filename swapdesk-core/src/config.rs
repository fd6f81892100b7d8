//! Client configuration: candidate endpoints and timing knobs.
//!
//! # Storage layout
//!
//! ```text
//! ~/.swapdesk/
//!   config.yaml   (mode 0600, optional; built-in defaults apply when absent)
//! ```
//!
//! # API pattern
//!
//! Same split as everywhere else in the workspace:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{BackendKind, Endpoint, Network};

/// Built-in rendezvous point used for seller discovery.
pub const DEFAULT_RENDEZVOUS_POINT: &str =
    "/dns4/discover.unstoppableswap.net/tcp/8888/p2p/12D3KooWA6cnqJpVnreBVnoro8midDL9Lpzmg8oJPoAGi7YYaamE";

pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 3_000;

pub const CONFIG_DIR: &str = ".swapdesk";
pub const CONFIG_FILE: &str = "config.yaml";

/// Candidate URLs for one backend kind, split by network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerNetwork {
    pub mainnet: Vec<String>,
    pub testnet: Vec<String>,
}

impl PerNetwork {
    pub fn for_network(&self, network: Network) -> &[String] {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }
}

/// Ordered candidate lists keyed by backend kind, then network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeLists {
    pub electrum: PerNetwork,
    pub monero: PerNetwork,
}

impl Default for NodeLists {
    fn default() -> Self {
        Self {
            electrum: PerNetwork {
                mainnet: strings(&[
                    "ssl://electrum.blockstream.info:50002",
                    "tcp://electrum.blockstream.info:50001",
                    "ssl://bitcoin.stackwallet.com:50002",
                    "ssl://b.1209k.com:50002",
                ]),
                testnet: strings(&[
                    "ssl://electrum.blockstream.info:60002",
                    "tcp://electrum.blockstream.info:60001",
                    "ssl://testnet.aranguren.org:51002",
                ]),
            },
            monero: PerNetwork {
                mainnet: strings(&[
                    "http://xmr-node.cakewallet.com:18081",
                    "http://node.sethforprivacy.com:18089",
                    "http://nodes.hashvault.pro:18081",
                ]),
                testnet: strings(&[
                    "http://node.sethforprivacy.com:38089",
                    "http://stagenet.xmr-tw.org:38081",
                    "http://node2.monerodevs.org:38089",
                ]),
            },
        }
    }
}

/// Root of `~/.swapdesk/config.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: Network,
    pub use_tor: bool,
    /// Overrides the daemon socket location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<PathBuf>,
    pub rendezvous_point: String,
    /// Wait before the single bootstrap retry.
    pub retry_delay_ms: u64,
    /// Wait before re-fetching a swap after a database-state change.
    pub settle_delay_ms: u64,
    pub nodes: NodeLists,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            use_tor: false,
            socket: None,
            rendezvous_point: DEFAULT_RENDEZVOUS_POINT.to_string(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            nodes: NodeLists::default(),
        }
    }
}

impl Config {
    /// Candidate endpoints for `(network, kind)` in configured order.
    pub fn candidates(&self, network: Network, kind: BackendKind) -> Vec<Endpoint> {
        let urls = match kind {
            BackendKind::Electrum => self.nodes.electrum.for_network(network),
            BackendKind::Monero => self.nodes.monero.for_network(network),
        };
        urls.iter()
            .map(|url| Endpoint::new(url.clone(), kind, network))
            .collect()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.swapdesk/`: pure, no I/O.
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR)
}

/// `<home>/.swapdesk/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<home>/.swapdesk/config.yaml`, falling back to defaults when the
/// file does not exist.
///
/// Returns `ConfigError::Parse` (with path) if the file is malformed.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Persist `config` atomically.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = load_at(home.path()).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.rendezvous_point, DEFAULT_RENDEZVOUS_POINT);
    }

    #[test]
    fn candidates_follow_network_and_kind() {
        let config = Config::default();
        let electrum = config.candidates(Network::Testnet, BackendKind::Electrum);
        assert!(!electrum.is_empty());
        assert!(electrum
            .iter()
            .all(|e| e.backend_kind == BackendKind::Electrum && e.network == Network::Testnet));
        assert_eq!(electrum[0].url, config.nodes.electrum.testnet[0]);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let home = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(config_dir_at(home.path())).expect("mkdir");
        std::fs::write(
            config_path_at(home.path()),
            "network: testnet\nsettle_delay_ms: 500\nnodes:\n  monero:\n    testnet: [\"http://127.0.0.1:38081\"]\n",
        )
        .expect("write");

        let config = load_at(home.path()).expect("load");
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.retry_delay(), Duration::from_millis(DEFAULT_RETRY_DELAY_MS));
        assert_eq!(config.nodes.monero.testnet, vec!["http://127.0.0.1:38081"]);
        assert!(config.nodes.monero.mainnet.is_empty());
        assert_eq!(config.nodes.electrum, NodeLists::default().electrum);
    }

    #[cfg(unix)]
    #[test]
    fn save_writes_private_file() {
        use std::os::unix::fs::PermissionsExt;
        let home = TempDir::new().expect("tempdir");
        let path = save_at(home.path(), &Config::default()).expect("save");
        let mode = std::fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
