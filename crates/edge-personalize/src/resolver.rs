//! Variant Resolver.

use std::sync::Arc;

use edge_core::RequestContext;

use crate::client::{DecisionRequest, DecisionService};
use crate::error::PersonalizeError;
use crate::session::{PersonalizeSession, UserUid, USER_UID_COOKIE};

/// Outcome of resolving a request's variants.
///
/// `variant_param` and `session` are either both present or both absent.
#[derive(Debug, Default)]
pub struct Resolution {
    pub variant_param: Option<String>,
    pub session: Option<PersonalizeSession>,
    /// Why resolution degraded, if it did.
    pub error: Option<PersonalizeError>,
}

impl Resolution {
    fn disabled() -> Self {
        Self::default()
    }

    fn degraded(error: PersonalizeError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Value for the forwarded variant header. Absent becomes `""`.
    pub fn header_value(&self) -> &str {
        self.variant_param.as_deref().unwrap_or_default()
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Resolves the variant assignment for inbound requests.
#[derive(Clone)]
pub struct VariantResolver {
    service: Arc<dyn DecisionService>,
    project_uid: Option<String>,
}

impl VariantResolver {
    /// Create a resolver. An unset or blank project uid turns resolution
    /// into a no-op.
    pub fn new(service: Arc<dyn DecisionService>, project_uid: Option<String>) -> Self {
        let project_uid = project_uid
            .map(|uid| uid.trim().to_string())
            .filter(|uid| !uid.is_empty());
        Self {
            service,
            project_uid,
        }
    }

    pub fn project_uid(&self) -> Option<&str> {
        self.project_uid.as_deref()
    }

    /// Resolve the variants for a request. Never fails: decision-service
    /// errors are reported through [`Resolution::error`].
    pub async fn resolve(&self, request: &RequestContext) -> Resolution {
        let Some(project_uid) = self.project_uid.as_deref() else {
            return Resolution::disabled();
        };

        let existing = request
            .cookie(USER_UID_COOKIE)
            .and_then(|value| UserUid::parse(&value));
        let new_visitor = existing.is_none();
        let user_uid = existing.unwrap_or_else(UserUid::generate);

        let decision = DecisionRequest::from_request(request, user_uid.clone());
        match self.service.decide(project_uid, &decision).await {
            Ok(manifest) => {
                let session = PersonalizeSession::new(user_uid, manifest, new_visitor);
                Resolution {
                    variant_param: Some(session.variant_param()),
                    session: Some(session),
                    error: None,
                }
            }
            Err(error) => Resolution::degraded(error),
        }
    }
}
