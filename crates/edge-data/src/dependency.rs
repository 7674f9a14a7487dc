//! Dependency tagging for semantic categorization.

/// Well-known dependency categories with semantic meaning.
///
/// Each tag carries a default retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Content repository (CMS delivery and preview APIs).
    Cms,
    /// Personalization decision service.
    Personalize,
    /// Origin/render layer behind the edge pipeline.
    Origin,
    /// Site backend routes called from the client side.
    Backend,
    /// Custom dependency with name.
    Custom(&'static str),
}

impl DependencyTag {
    /// Get the default max retries for this dependency type.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Cms => 1,
            // Personalization degrades instead of waiting; origin requests
            // may carry non-idempotent bodies.
            Self::Personalize | Self::Origin | Self::Backend => 0,
            Self::Custom(_) => 1,
        }
    }

    /// Check if this dependency is critical (failure fails the request).
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Origin | Self::Cms)
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &str {
        match self {
            Self::Cms => "cms",
            Self::Personalize => "personalize",
            Self::Origin => "origin",
            Self::Backend => "backend",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
