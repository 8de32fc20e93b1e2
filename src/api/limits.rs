//! Per-model context budget resolution with a TTL cache.
//!
//! Budgets come from the OpenRouter model catalog when reachable, falling
//! back to a static table of known model families. Resolution never fails:
//! an inaccurate budget beats blocking the whole run on catalog availability.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

/// Budget used when neither the catalog nor the family table knows the model.
pub const DEFAULT_CONTEXT_LENGTH: u64 = 4096;

/// Known context limits for model families, matched as substrings of the
/// model identifier in declaration order (first match wins). Specific
/// fragments are listed before the families they extend so `gpt-4-turbo`
/// does not resolve to the plain `gpt-4` budget.
pub const MODEL_TOKEN_LIMITS: &[(&str, u64)] = &[
    ("gpt-4o", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5", 16_384),
    ("claude-3", 200_000),
    ("claude", 100_000),
    ("gemini", 32_768),
    ("mistral", 32_768),
    ("llama-3", 8_192),
    ("llama-2", 4_096),
    ("llama", 4_096),
    ("qwen", 32_768),
];

/// How long a catalog entry stays valid.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Catalog metadata for a single model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub context_length: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ModelCatalog {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

struct CacheEntry {
    info: ModelInfo,
    expires_at: Instant,
}

/// Context budget resolver backed by the OpenRouter model catalog.
///
/// The cache is keyed by the lower-cased identifier the caller asked for,
/// not the catalog id a partial match landed on. Entries are only replaced
/// after their TTL elapses.
pub struct ModelLimits {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl ModelLimits {
    pub fn new(http: reqwest::Client, base_url: String, api_token: String) -> Self {
        Self::with_ttl(http, base_url, api_token, CACHE_TTL)
    }

    /// Construct with a custom cache TTL. Used by tests to force expiry.
    pub fn with_ttl(
        http: reqwest::Client,
        base_url: String,
        api_token: String,
        ttl: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            api_token,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the context budget for `model`, in tokens.
    ///
    /// Catalog failures of any kind (network, non-success status, malformed
    /// body, no match) degrade silently to [`family_context_length`].
    pub async fn context_length(&self, model: &str) -> u64 {
        if let Some(info) = self.fetch_model_info(model).await
            && let Some(length) = info.context_length
        {
            return length;
        }
        family_context_length(model)
    }

    /// Look up `model` in the catalog, serving from the cache when possible.
    ///
    /// A single list call covers all models; the requested identifier is
    /// matched exactly (case-insensitive) first, then as a substring of any
    /// catalog id. Successful matches are cached for the TTL.
    async fn fetch_model_info(&self, model: &str) -> Option<ModelInfo> {
        let key = model.to_lowercase();

        if let Some(entry) = self.cache().get(&key)
            && Instant::now() < entry.expires_at
        {
            return Some(entry.info.clone());
        }

        // Lock is not held across the network call; concurrent callers at
        // worst duplicate one catalog fetch.
        let catalog = match self.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                debug!("Model catalog lookup failed, using fallback table: {e}");
                return None;
            }
        };

        let info = catalog
            .data
            .iter()
            .find(|m| m.id.to_lowercase() == key)
            .or_else(|| catalog.data.iter().find(|m| m.id.to_lowercase().contains(&key)))
            .cloned()?;

        self.cache().insert(
            key,
            CacheEntry {
                info: info.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );

        Some(info)
    }

    async fn fetch_catalog(&self) -> Result<ModelCatalog, reqwest::Error> {
        self.http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_token)
            .send()
            .await?
            .error_for_status()?
            .json::<ModelCatalog>()
            .await
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve a budget from the static family table.
///
/// Fragments are checked in table order against the lower-cased identifier;
/// the first match wins. Unknown models get [`DEFAULT_CONTEXT_LENGTH`].
pub fn family_context_length(model: &str) -> u64 {
    let model = model.to_lowercase();
    for (fragment, limit) in MODEL_TOKEN_LIMITS {
        if model.contains(fragment) {
            return *limit;
        }
    }
    DEFAULT_CONTEXT_LENGTH
}
