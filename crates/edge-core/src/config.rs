//! Site configuration.
//!
//! Configuration is read through a key lookup so the same code serves
//! process environment variables, Spin variables and test fixtures. Keys use
//! the upper-case environment names (`CONTENTSTACK_API_KEY`, ...).

use serde::{Deserialize, Serialize};

use crate::locale::{LocaleSet, LocaleSetError};

/// Hosting target on which edge personalization is handled elsewhere.
pub const HOSTING_LAUNCH: &str = "launch";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("locale configuration: {0}")]
    Locale(#[from] LocaleSetError),
}

/// How requests without a locale prefix are sent to their localized path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleStrategy {
    /// Internal rewrite; the client URL is unchanged.
    #[default]
    Rewrite,
    /// 307 redirect to the prefixed path.
    Redirect,
}

/// Content repository (CMS) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    pub api_key: String,
    pub delivery_token: String,
    pub environment: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_token: Option<String>,
    #[serde(default = "default_preview_host")]
    pub preview_host: String,
    #[serde(default)]
    pub live_preview_enabled: bool,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_host() -> String {
    "cdn.contentstack.io".to_string()
}

fn default_region() -> String {
    "us".to_string()
}

fn default_preview_host() -> String {
    "rest-preview.contentstack.com".to_string()
}

/// Personalization decision-service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalizeConfig {
    /// Project identifier. Unset disables variant resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_uid: Option<String>,
    /// Override for the decision service endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_api_url: Option<String>,
    /// Also copy the variant parameter into the forwarded query string.
    #[serde(default)]
    pub propagate_query: bool,
}

/// Locale routing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(flatten)]
    pub locales: LocaleSet,
    #[serde(default)]
    pub strategy: LocaleStrategy,
}

/// Complete site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub cms: CmsConfig,
    #[serde(default)]
    pub personalize: PersonalizeConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Deployment target (e.g. "launch").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting: Option<String>,
}

impl SiteConfig {
    /// Build configuration from a key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let cms = CmsConfig {
            api_key: required("CONTENTSTACK_API_KEY")?,
            delivery_token: required("CONTENTSTACK_DELIVERY_TOKEN")?,
            environment: required("CONTENTSTACK_ENVIRONMENT")?,
            branch: get("CONTENTSTACK_BRANCH").unwrap_or_else(default_branch),
            host: get("CONTENTSTACK_HOST").unwrap_or_else(default_host),
            region: get("CONTENTSTACK_REGION").unwrap_or_else(default_region),
            preview_token: get("CONTENTSTACK_PREVIEW_TOKEN"),
            preview_host: get("CONTENTSTACK_PREVIEW_HOST").unwrap_or_else(default_preview_host),
            live_preview_enabled: parse_bool("LIVE_PREVIEW_ENABLED", get("LIVE_PREVIEW_ENABLED"))?,
        };

        let personalize = PersonalizeConfig {
            project_uid: get("CONTENTSTACK_PERSONALIZATION"),
            edge_api_url: get("CONTENTSTACK_PERSONALIZE_EDGE_API_URL"),
            propagate_query: parse_bool(
                "SITE_PROPAGATE_VARIANT_QUERY",
                get("SITE_PROPAGATE_VARIANT_QUERY"),
            )?,
        };

        let locales = match get("SITE_LOCALES") {
            Some(list) => {
                let default = get("SITE_DEFAULT_LOCALE").unwrap_or_else(|| "en".to_string());
                LocaleSet::new(list.split(','), default)?
            }
            None => match get("SITE_DEFAULT_LOCALE") {
                Some(default) => LocaleSet::new(LocaleSet::default().codes().to_vec(), default)?,
                None => LocaleSet::default(),
            },
        };

        let strategy = match get("SITE_LOCALE_STRATEGY").as_deref() {
            None | Some("rewrite") => LocaleStrategy::Rewrite,
            Some("redirect") => LocaleStrategy::Redirect,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SITE_LOCALE_STRATEGY",
                    reason: format!("expected 'rewrite' or 'redirect', got '{}'", other),
                })
            }
        };

        let config = Self {
            cms,
            personalize,
            locale: LocaleConfig { locales, strategy },
            hosting: get("HOSTING"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cms.api_key.is_empty() {
            return Err(ConfigError::Missing("CONTENTSTACK_API_KEY"));
        }
        if self.cms.delivery_token.is_empty() {
            return Err(ConfigError::Missing("CONTENTSTACK_DELIVERY_TOKEN"));
        }
        if self.cms.environment.is_empty() {
            return Err(ConfigError::Missing("CONTENTSTACK_ENVIRONMENT"));
        }
        if let Some(url) = &self.personalize.edge_api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    key: "CONTENTSTACK_PERSONALIZE_EDGE_API_URL",
                    reason: format!("not an absolute http(s) url: {}", url),
                });
            }
        }
        Ok(())
    }

    /// Whether the edge pipeline runs personalization on this deployment.
    pub fn personalization_enabled(&self) -> bool {
        self.hosting.as_deref() != Some(HOSTING_LAUNCH)
    }
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref() {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected boolean, got '{}'", other),
        }),
    }
}
