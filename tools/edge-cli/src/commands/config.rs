//! Configuration commands.

use std::fs;

use anyhow::{bail, Result};
use edge_core::{LocaleStrategy, SiteConfig};
use serde_json::json;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;
use crate::output::redact;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

/// Configuration with secrets replaced, for display.
fn redacted(site: &SiteConfig) -> SiteConfig {
    let mut site = site.clone();
    site.cms.delivery_token = redact(&site.cms.delivery_token);
    site.cms.preview_token = site.cms.preview_token.as_deref().map(redact);
    site
}

async fn show_config(ctx: &Context) -> Result<()> {
    let (site, source) = ctx.site_config()?;
    let site = redacted(&site);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "source": source.to_string(),
            "site": site,
        }));
        return Ok(());
    }

    ctx.output.header("Site Configuration");
    ctx.output.kv("source", &source.to_string());

    ctx.output.info("[cms]");
    ctx.output.kv("api_key", &site.cms.api_key);
    ctx.output.kv("delivery_token", &site.cms.delivery_token);
    ctx.output.kv("environment", &site.cms.environment);
    ctx.output.kv("branch", &site.cms.branch);
    ctx.output.kv("host", &site.cms.host);
    ctx.output.kv("region", &site.cms.region);
    if let Some(token) = &site.cms.preview_token {
        ctx.output.kv("preview_token", token);
    }
    ctx.output.kv("preview_host", &site.cms.preview_host);
    ctx.output.kv("live_preview_enabled", &site.cms.live_preview_enabled.to_string());

    ctx.output.info("[personalize]");
    ctx.output.kv(
        "project_uid",
        site.personalize.project_uid.as_deref().unwrap_or("(unset)"),
    );
    ctx.output.kv(
        "edge_api_url",
        site.personalize.edge_api_url.as_deref().unwrap_or("(default)"),
    );
    ctx.output.kv("propagate_query", &site.personalize.propagate_query.to_string());
    ctx.output.kv("enabled", &site.personalization_enabled().to_string());

    ctx.output.info("[locale]");
    ctx.output.kv("supported", &site.locale.locales.codes().join(", "));
    ctx.output.kv("default", site.locale.locales.default_locale().as_str());
    ctx.output.kv(
        "strategy",
        match site.locale.strategy {
            LocaleStrategy::Rewrite => "rewrite",
            LocaleStrategy::Redirect => "redirect",
        },
    );

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("edge.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

/// Settings that are valid but probably not what the operator wants.
fn warnings(site: &SiteConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if site.personalize.project_uid.is_none() {
        warnings.push(
            "personalization project is unset: every visitor gets default content".to_string(),
        );
    }
    if !site.personalization_enabled() {
        warnings.push(format!(
            "hosting '{}' runs personalization outside the edge pipeline",
            site.hosting.as_deref().unwrap_or_default()
        ));
    }
    if site.cms.live_preview_enabled && site.cms.preview_token.is_none() {
        warnings.push("live preview is enabled but no preview token is set".to_string());
    }

    warnings
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (site, source) = ctx.site_config()?;
    ctx.output.debug(&format!("Loaded from {}", source));

    let warnings = warnings(&site);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "valid": true,
            "source": source.to_string(),
            "warnings": warnings,
        }));
        return Ok(());
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(pairs: &[(&str, &str)]) -> SiteConfig {
        SiteConfig::from_lookup(|key| {
            [
                ("CONTENTSTACK_API_KEY", "blt1"),
                ("CONTENTSTACK_DELIVERY_TOKEN", "cs-delivery-token"),
                ("CONTENTSTACK_ENVIRONMENT", "production"),
            ]
            .iter()
            .chain(pairs.iter())
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_redacted_hides_tokens() {
        let shown = redacted(&site(&[("CONTENTSTACK_PREVIEW_TOKEN", "preview-secret")]));
        assert_eq!(shown.cms.delivery_token, "****oken");
        assert_eq!(shown.cms.preview_token.as_deref(), Some("****cret"));
        assert_eq!(shown.cms.api_key, "blt1");
    }

    #[test]
    fn test_warnings() {
        let all = warnings(&site(&[("HOSTING", "launch"), ("LIVE_PREVIEW_ENABLED", "true")]));
        assert_eq!(all.len(), 3);

        let none = warnings(&site(&[
            ("CONTENTSTACK_PERSONALIZATION", "proj"),
            ("CONTENTSTACK_PREVIEW_TOKEN", "p"),
            ("LIVE_PREVIEW_ENABLED", "true"),
        ]));
        assert!(none.is_empty());
    }
}
