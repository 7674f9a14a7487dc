//! The content query contract.

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::ContentError;
use crate::preview::LivePreviewQuery;

/// Queries every content client answers with the same semantics.
///
/// `locale` defaults to `"en"`; `variant_param` is the wire-format
/// assignment (`"exp=var,..."`) and is encoded before querying. Zero
/// matches is `Ok(vec![])` or `Ok(None)`, never an error.
#[async_trait(?Send)]
pub trait ContentSource: Send + Sync {
    async fn get_by_type(
        &self,
        content_type: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError>;

    async fn get_by_id(
        &self,
        id: &str,
        content_type: &str,
        locale: Option<&str>,
        references: &[String],
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Option<Entry>, ContentError>;

    async fn get_by_url(
        &self,
        content_type: &str,
        url: &str,
        locale: Option<&str>,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError>;

    async fn get_by_taxonomy(
        &self,
        content_type: &str,
        locale: Option<&str>,
        term: &str,
        preview: &LivePreviewQuery,
        variant_param: Option<&str>,
    ) -> Result<Vec<Entry>, ContentError>;
}
