//! Public SDK for the personalized edge site.
//!
//! This crate re-exports all platform functionality:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! let config = SiteConfig::from_env()?;
//! let resolver = VariantResolver::new(decisions, config.personalize.project_uid.clone());
//! let pipeline = EdgePipeline::from_config(&config, resolver, FetchClient::new(origin));
//!
//! let response = pipeline.handle(RequestContext::get("/about?x=1")?).await?;
//! assert_eq!(response.header("cache-control"), Some("no-store"));
//! ```

pub use edge_cache;
pub use edge_cms;
pub use edge_core;
pub use edge_data;
pub use edge_locale;
pub use edge_observability;
pub use edge_personalize;
pub use edge_pipeline;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_cache::*;
    pub use edge_cms::*;
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_locale::*;
    pub use edge_observability::*;
    pub use edge_personalize::*;
    pub use edge_pipeline::*;
}
