use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tipstore_content::{PublicUrlResolver, MAX_PAYLOAD_SIZE};
use tipstore_repo::RepositoryConfig;
use tipstore_types::EntityKind;

use crate::error::{SdkError, SdkResult};

/// Settings for a storage orchestrator, usually read from `tipstore.toml`.
///
/// Every field has a default, so an empty file is a valid configuration:
///
/// ```toml
/// data_dir = ".tipstore"
/// event_ttl_secs = 300
/// speaker_ttl_secs = 600
/// tip_ttl_secs = 120
/// poll_interval_secs = 5
///
/// [content]
/// account = "0xabc"
/// gateway_host = "gateway.example.net"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub event_ttl_secs: u64,
    pub speaker_ttl_secs: u64,
    pub tip_ttl_secs: u64,
    pub poll_interval_secs: u64,
    pub content: ContentConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Account the public URLs are built for.
    pub account: String,
    pub gateway_host: String,
    /// Payload ceiling; clamped to the network's 254 MiB limit.
    pub max_payload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tipstore"),
            event_ttl_secs: 300,
            speaker_ttl_secs: 600,
            tip_ttl_secs: 120,
            poll_interval_secs: 5,
            content: ContentConfig::default(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            account: "anonymous".into(),
            gateway_host: "gateway.localhost".into(),
            max_payload_bytes: MAX_PAYLOAD_SIZE,
        }
    }
}

impl StorageConfig {
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> SdkResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn repository_config(&self, kind: EntityKind) -> RepositoryConfig {
        let secs = match kind {
            EntityKind::Event => self.event_ttl_secs,
            EntityKind::Speaker => self.speaker_ttl_secs,
            EntityKind::Tip => self.tip_ttl_secs,
        };
        RepositoryConfig::with_ttl(Duration::from_secs(secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn resolver(&self) -> PublicUrlResolver {
        PublicUrlResolver::new(&self.content.account, &self.content.gateway_host)
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn local_dir(&self) -> PathBuf {
        self.data_dir.join("local")
    }
}
