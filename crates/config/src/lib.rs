// crates/config/src/lib.rs

use core::time::Duration;
use std::fs::{read_to_string, write};

use camino::Utf8Path;
use eyre::{Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";

/// How long a freshly fetched collection may be served from memory.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ConfigFile {
    pub api: ApiConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ApiConfig {
    /// Base address every endpoint path is appended to.
    pub url: Url,
    #[serde(
        rename = "timeout_ms",
        with = "serde_duration",
        default = "default_request_timeout"
    )]
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub const fn new(url: Url, timeout: Duration) -> Self {
        Self { url, timeout }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct SyncConfig {
    #[serde(default)]
    pub ttl: TtlConfig,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl SyncConfig {
    #[must_use]
    pub const fn new(ttl: TtlConfig, page_size: u32) -> Self {
        Self { ttl, page_size }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(TtlConfig::default(), DEFAULT_PAGE_SIZE)
    }
}

/// Cache lifetime per resource kind. Fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct TtlConfig {
    #[serde(rename = "friends_ms", with = "serde_duration", default = "default_ttl")]
    pub friends: Duration,
    #[serde(
        rename = "friend_requests_ms",
        with = "serde_duration",
        default = "default_ttl"
    )]
    pub friend_requests: Duration,
    #[serde(
        rename = "friend_count_ms",
        with = "serde_duration",
        default = "default_ttl"
    )]
    pub friend_count: Duration,
    #[serde(rename = "search_ms", with = "serde_duration", default = "default_ttl")]
    pub search: Duration,
    #[serde(rename = "tickets_ms", with = "serde_duration", default = "default_ttl")]
    pub tickets: Duration,
    #[serde(
        rename = "friend_tickets_ms",
        with = "serde_duration",
        default = "default_ttl"
    )]
    pub friend_tickets: Duration,
}

impl TtlConfig {
    /// Same lifetime for every resource kind.
    #[must_use]
    pub const fn uniform(ttl: Duration) -> Self {
        Self {
            friends: ttl,
            friend_requests: ttl,
            friend_count: ttl,
            search: ttl,
            tickets: ttl,
            friend_tickets: ttl,
        }
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self::uniform(DEFAULT_TTL)
    }
}

const fn default_ttl() -> Duration {
    DEFAULT_TTL
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ConfigFile {
    #[must_use]
    pub const fn new(api: ApiConfig, sync: SyncConfig) -> Self {
        Self { api, sync }
    }

    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path:?}"))?;

        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse configuration at {path:?}"))
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path:?}"))?;

        Ok(())
    }

    /// Only write config file if changes are detected
    pub fn save_if_changed(&self, dir: &Utf8Path) -> EyreResult<bool> {
        let path = dir.join(CONFIG_FILE);
        let new_content = toml::to_string_pretty(self)?;

        let changed = read_to_string(&path).map_or(true, |existing| existing != new_content);

        if changed {
            write(&path, new_content)
                .wrap_err_with(|| format!("failed to write configuration to {path:?}"))?;
        }

        Ok(changed)
    }

    /// Get the value for a specific config key
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<String> {
        let ttl = &self.sync.ttl;
        let millis = |d: Duration| d.as_millis().to_string();

        match key {
            "api.url" => Some(self.api.url.to_string()),
            "api.timeout_ms" => Some(millis(self.api.timeout)),
            "sync.page_size" => Some(self.sync.page_size.to_string()),
            "sync.ttl.friends_ms" => Some(millis(ttl.friends)),
            "sync.ttl.friend_requests_ms" => Some(millis(ttl.friend_requests)),
            "sync.ttl.friend_count_ms" => Some(millis(ttl.friend_count)),
            "sync.ttl.search_ms" => Some(millis(ttl.search)),
            "sync.ttl.tickets_ms" => Some(millis(ttl.tickets)),
            "sync.ttl.friend_tickets_ms" => Some(millis(ttl.friend_tickets)),
            _ => None,
        }
    }
}

mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
