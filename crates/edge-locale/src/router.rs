//! Locale Router.

use edge_core::{Locale, LocaleSet, LocaleStrategy, RequestContext};

use crate::asset::AssetMatcher;

/// Path segment that marks API routes.
pub const API_SEGMENT: &str = "api";

/// Routing decision for an inbound path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Build artifact or static file: forward untouched.
    AssetBypass,
    /// API route: variant header, no locale rewrite.
    ApiPassthrough,
    /// Page without a locale prefix: send to the prefixed path.
    LocaleRewrite(Locale),
    /// Page that already carries a supported locale.
    Continue(Locale),
}

impl RouteDecision {
    /// Locale a page will render in. `None` for assets and API routes.
    pub fn locale(&self) -> Option<&Locale> {
        match self {
            Self::LocaleRewrite(locale) | Self::Continue(locale) => Some(locale),
            Self::AssetBypass | Self::ApiPassthrough => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssetBypass => "asset_bypass",
            Self::ApiPassthrough => "api_passthrough",
            Self::LocaleRewrite(_) => "locale_rewrite",
            Self::Continue(_) => "continue",
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.locale() {
            Some(locale) => write!(f, "{}({})", self.name(), locale),
            None => f.write_str(self.name()),
        }
    }
}

/// Classifies request paths.
#[derive(Debug, Clone, Default)]
pub struct LocaleRouter {
    locales: LocaleSet,
    assets: AssetMatcher,
    strategy: LocaleStrategy,
}

impl LocaleRouter {
    pub fn new(locales: LocaleSet) -> Self {
        Self {
            locales,
            ..Default::default()
        }
    }

    pub fn with_assets(mut self, assets: AssetMatcher) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_strategy(mut self, strategy: LocaleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn strategy(&self) -> LocaleStrategy {
        self.strategy
    }

    pub fn route(&self, request: &RequestContext) -> RouteDecision {
        self.route_path(request.path())
    }

    /// Classify a bare path.
    pub fn route_path(&self, path: &str) -> RouteDecision {
        if self.assets.is_asset(path) {
            return RouteDecision::AssetBypass;
        }

        let first = path.split('/').find(|s| !s.is_empty());
        if first == Some(API_SEGMENT) {
            return RouteDecision::ApiPassthrough;
        }

        match first.and_then(|segment| self.locales.get(segment)) {
            Some(locale) => RouteDecision::Continue(locale),
            None => RouteDecision::LocaleRewrite(self.locales.default_locale()),
        }
    }
}
