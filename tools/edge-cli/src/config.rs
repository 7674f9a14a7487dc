//! CLI configuration.

use anyhow::{Context, Result};
use edge_core::SiteConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file (`edge.toml` or `edge.json`).
///
/// Without a `[site]` table the site configuration comes from the
/// process environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteConfig>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Generate a default edge.toml config file.
pub fn generate_default_config() -> String {
    r#"# Edge site configuration
#
# Remove the [site] tables to read CONTENTSTACK_* and SITE_* from the
# environment instead.

[site]
# Set to "launch" where the host runs personalization itself.
# hosting = "launch"

[site.cms]
api_key = ""
delivery_token = ""
environment = "production"
branch = "main"
host = "cdn.contentstack.io"
region = "us"
# preview_token = ""
preview_host = "rest-preview.contentstack.com"
live_preview_enabled = false

[site.personalize]
# project_uid = ""
# edge_api_url = "https://personalize-edge.contentstack.com"
propagate_query = false

[site.locale]
supported = ["en", "es", "fr", "de"]
default = "en"
strategy = "rewrite"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_site() {
        let config = CliConfig::parse(
            "edge.toml",
            r#"
[site.cms]
api_key = "blt1"
delivery_token = "cs1"
environment = "staging"

[site.locale]
supported = ["en", "ja"]
default = "ja"
strategy = "redirect"
"#,
        )
        .unwrap();

        let site = config.site.unwrap();
        assert_eq!(site.cms.branch, "main");
        assert_eq!(site.locale.locales.default_locale().as_str(), "ja");
        assert_eq!(site.locale.strategy, edge_core::LocaleStrategy::Redirect);
        assert!(site.personalize.project_uid.is_none());
    }

    #[test]
    fn test_parse_json_without_site() {
        let config = CliConfig::parse("edge.json", "{}").unwrap();
        assert!(config.site.is_none());
    }

    #[test]
    fn test_invalid_locale_set_rejected() {
        let result = CliConfig::parse(
            "edge.toml",
            r#"
[site.cms]
api_key = "a"
delivery_token = "b"
environment = "c"

[site.locale]
supported = ["en"]
default = "fr"
"#,
        );
        assert!(result.is_err());
    }
}
