//! Supported locales.

use serde::{Deserialize, Serialize};

/// A locale that is known to be in the configured [`LocaleSet`].
///
/// Values are only handed out by [`LocaleSet`], so holding a `Locale` means
/// the site supports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Locale(String);

impl Locale {
    /// Locale code (e.g. "en").
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error building a locale set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleSetError {
    #[error("locale set is empty")]
    Empty,

    #[error("default locale '{0}' is not in the supported set")]
    DefaultNotSupported(String),
}

/// Fixed set of supported locales plus the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLocaleSet", into = "RawLocaleSet")]
pub struct LocaleSet {
    supported: Vec<String>,
    default: String,
}

#[derive(Serialize, Deserialize)]
struct RawLocaleSet {
    supported: Vec<String>,
    default: String,
}

impl TryFrom<RawLocaleSet> for LocaleSet {
    type Error = LocaleSetError;

    fn try_from(raw: RawLocaleSet) -> Result<Self, Self::Error> {
        LocaleSet::new(raw.supported, raw.default)
    }
}

impl From<LocaleSet> for RawLocaleSet {
    fn from(set: LocaleSet) -> Self {
        Self {
            supported: set.supported,
            default: set.default,
        }
    }
}

impl LocaleSet {
    /// Create a locale set. The default must be one of the supported codes.
    pub fn new<I, S>(supported: I, default: impl Into<String>) -> Result<Self, LocaleSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes: Vec<String> = Vec::new();
        for code in supported {
            let code = code.into().trim().to_string();
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        if codes.is_empty() {
            return Err(LocaleSetError::Empty);
        }

        let default = default.into();
        if !codes.contains(&default) {
            return Err(LocaleSetError::DefaultNotSupported(default));
        }

        Ok(Self {
            supported: codes,
            default,
        })
    }

    /// Look up a supported locale by exact code.
    pub fn get(&self, code: &str) -> Option<Locale> {
        self.supported
            .iter()
            .find(|c| c.as_str() == code)
            .map(|c| Locale(c.clone()))
    }

    /// Whether the code is supported.
    pub fn contains(&self, code: &str) -> bool {
        self.supported.iter().any(|c| c == code)
    }

    /// The default locale.
    pub fn default_locale(&self) -> Locale {
        Locale(self.default.clone())
    }

    /// Supported codes in configuration order.
    pub fn codes(&self) -> &[String] {
        &self.supported
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        Self {
            supported: ["en", "es", "fr", "de"].iter().map(|s| s.to_string()).collect(),
            default: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let set = LocaleSet::default();
        assert_eq!(set.codes(), &["en", "es", "fr", "de"]);
        assert_eq!(set.default_locale().as_str(), "en");
    }

    #[test]
    fn test_get_only_supported() {
        let set = LocaleSet::default();
        assert_eq!(set.get("fr").map(|l| l.to_string()), Some("fr".to_string()));
        assert!(set.get("it").is_none());
        assert!(set.get("EN").is_none());
    }

    #[test]
    fn test_default_must_be_supported() {
        let err = LocaleSet::new(["en", "es"], "fr").unwrap_err();
        assert_eq!(err, LocaleSetError::DefaultNotSupported("fr".to_string()));
    }

    #[test]
    fn test_empty_rejected() {
        let err = LocaleSet::new(Vec::<String>::new(), "en").unwrap_err();
        assert_eq!(err, LocaleSetError::Empty);
    }

    #[test]
    fn test_duplicates_and_blanks_dropped() {
        let set = LocaleSet::new(["en", " ", "en", "de"], "de").unwrap();
        assert_eq!(set.codes(), &["en", "de"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad: Result<LocaleSet, _> =
            serde_json::from_str(r#"{"supported":["en"],"default":"fr"}"#);
        assert!(bad.is_err());
    }
}
