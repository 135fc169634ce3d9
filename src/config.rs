use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "WoundWise";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Google Generative Language API, v1beta surface.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables read by `EngineConfig::from_env`.
pub const ENV_API_KEY: &str = "WOUNDWISE_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_API_BASE: &str = "WOUNDWISE_API_BASE";
pub const ENV_MODEL: &str = "WOUNDWISE_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "WOUNDWISE_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "woundwise_lib=info,woundwise=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Generation parameters sent with every classification request.
///
/// Low temperature keeps the classifier literal and repeatable.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Everything the engine needs to reach the classification endpoint.
///
/// The credential is never defaulted: with no key the client fails closed
/// and every assessment resolves through the fallback scorer.
#[derive(Clone)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    pub generation: GenerationSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            generation: GenerationSettings::default(),
        }
    }
}

// Keeps the credential out of debug logs.
impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("generation", &self.generation)
            .finish()
    }
}

impl EngineConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.api_key = non_blank(ENV_API_KEY).or_else(|| non_blank(ENV_API_KEY_FALLBACK));

        if let Some(base) = non_blank(ENV_API_BASE) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_blank(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = non_blank(ENV_TIMEOUT_SECS) {
            config.timeout_secs = match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: ENV_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// `{api_base}/models/{model}:generateContent`
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}
