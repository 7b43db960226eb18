use crate::cache::CacheConfig;
use crate::error::Result;
use crate::language::Language;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::path::Path;

/// Environment variables override the file, e.g. `MATH_ADMIN_BASE_URL` or
/// `MATH_ADMIN_CACHE__TTL_SECS`.
pub const ENV_PREFIX: &str = "MATH_ADMIN_";

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct CacheSettings {
    #[serde_inline_default(true)]
    enabled: bool,
    #[serde_inline_default(300)]
    ttl_secs: i64,
    #[serde_inline_default(500)]
    max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 500,
        }
    }
}

/// Longest accepted TTL; larger values are clamped to it.
pub const MAX_TTL_SECS: i64 = 365 * 24 * 60 * 60;

impl CacheSettings {
    /// `ttl_secs` is clamped to `0..=MAX_TTL_SECS`.
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: chrono::Duration::seconds(self.ttl_secs.clamp(0, MAX_TTL_SECS)),
            max_entries: self.max_entries,
            enabled: self.enabled,
        }
    }
}

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct ClientConfig {
    #[serde_inline_default("http://localhost:3000".to_string())]
    base_url: String,
    #[serde_inline_default(20)]
    page_size: u32,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    cache: CacheSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            page_size: 20,
            language: Language::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then `path` if it exists, then `MATH_ADMIN_*` variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::figment(path).extract().map_err(Into::into)
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ClientConfig::load("missing.yaml").expect("defaults load");
            assert_eq!(config, ClientConfig::default());
            assert_eq!(config.page_size(), &20);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "admin.yaml",
                "base_url: https://admin.example.org/api\nlanguage: en\ncache:\n  ttl_secs: 60\n",
            )?;
            jail.set_env("MATH_ADMIN_PAGE_SIZE", "50");
            jail.set_env("MATH_ADMIN_CACHE__ENABLED", "false");

            let config = ClientConfig::load("admin.yaml").expect("config loads");
            assert_eq!(config.base_url(), "https://admin.example.org/api");
            assert_eq!(config.language(), &Language::En);
            assert_eq!(config.page_size(), &50);
            assert_eq!(config.cache().ttl_secs(), &60);
            assert!(!config.cache().enabled());
            assert_eq!(config.cache().max_entries(), &500);
            Ok(())
        });
    }

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        Jail::expect_with(|jail| {
            jail.set_env("MATH_ADMIN_CACHE__TTL_SECS", i64::MAX.to_string());
            let config = ClientConfig::load("missing.yaml").expect("config loads");
            let cache = config.cache().to_cache_config();
            assert_eq!(cache.ttl, chrono::Duration::seconds(MAX_TTL_SECS));

            jail.set_env("MATH_ADMIN_CACHE__TTL_SECS", "-5");
            let config = ClientConfig::load("missing.yaml").expect("config loads");
            assert_eq!(config.cache().to_cache_config().ttl, chrono::Duration::zero());
            Ok(())
        });
    }
}
