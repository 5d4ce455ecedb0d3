use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::AdapterError;

/// Model used when the config store has no model setting.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Key/value lookup for model names and prompt templates.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
}

#[async_trait]
impl<T: ConfigProvider + ?Sized> ConfigProvider for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Option<String> {
        (**self).get(key).await
    }
}

/// Fetch a setting that has no safe default (prompt text).
///
/// Blank values count as missing.
pub async fn require_setting(
    provider: &(impl ConfigProvider + ?Sized),
    key: &str,
) -> Result<String, AdapterError> {
    match provider.get(key).await {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            tracing::error!(key, "required setting is missing");
            Err(AdapterError::MissingConfig(key.to_string()))
        }
    }
}

/// Fetch a model name, falling back to [`DEFAULT_MODEL`].
pub async fn model_setting(provider: &(impl ConfigProvider + ?Sized), key: &str) -> String {
    match provider.get(key).await {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            tracing::debug!(key, default = DEFAULT_MODEL, "model setting absent, using default");
            DEFAULT_MODEL.to_string()
        }
    }
}

/// Settings held in memory, optionally loaded from a JSON file.
///
/// File shape: `{ "analysis_prompt": "...", "analysis_model": "gpt-4.1-mini" }`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StaticConfig {
    values: HashMap<String, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;

        let config: StaticConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")?;

        Ok(config)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl ConfigProvider for StaticConfig {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Settings read from environment variables.
///
/// Key `analysis_prompt` maps to `LEXBRIDGE_ANALYSIS_PROMPT` with the default prefix.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::with_prefix("LEXBRIDGE_")
    }
}

impl EnvConfig {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn var_name(&self, key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

#[async_trait]
impl ConfigProvider for EnvConfig {
    async fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key)).ok()
    }
}

/// Read-through cache over another provider. Only hits are cached, so a
/// setting added later is still picked up.
pub struct CachedConfig<P> {
    inner: P,
    cache: RwLock<HashMap<String, String>>,
}

impl<P: ConfigProvider> CachedConfig<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }
}

#[async_trait]
impl<P: ConfigProvider> ConfigProvider for CachedConfig<P> {
    async fn get(&self, key: &str) -> Option<String> {
        if let Some(v) = self.cache.read().await.get(key) {
            return Some(v.clone());
        }
        let value = self.inner.get(key).await?;
        self.cache
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Some(value)
    }
}
