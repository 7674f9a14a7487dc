//! Variant assignment wire format.

use serde::{Deserialize, Serialize};

/// One experience and the variant the visitor sees in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPair {
    pub experience: String,
    pub variant: String,
}

/// Ordered set of experience/variant pairs.
///
/// Wire format is `"expA=varX,expB=varY"`. An empty assignment means control
/// content everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAssignment {
    pairs: Vec<VariantPair>,
}

impl VariantAssignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the wire format. Empty segments and segments without `=` are
    /// skipped.
    pub fn parse(wire: &str) -> Self {
        wire.split(',')
            .filter_map(|segment| {
                let (experience, variant) = segment.split_once('=')?;
                if experience.is_empty() || variant.is_empty() {
                    return None;
                }
                Some(VariantPair {
                    experience: experience.to_string(),
                    variant: variant.to_string(),
                })
            })
            .collect()
    }

    /// Append a pair. A later pair for the same experience replaces the
    /// earlier one in place.
    pub fn push(&mut self, experience: impl Into<String>, variant: impl Into<String>) {
        let experience = experience.into();
        let variant = variant.into();
        match self.pairs.iter_mut().find(|p| p.experience == experience) {
            Some(existing) => existing.variant = variant,
            None => self.pairs.push(VariantPair { experience, variant }),
        }
    }

    /// Variant assigned for an experience.
    pub fn variant_for(&self, experience: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.experience == experience)
            .map(|p| p.variant.as_str())
    }

    pub fn pairs(&self) -> &[VariantPair] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Encode in the wire format.
    pub fn to_wire(&self) -> String {
        self.pairs
            .iter()
            .map(|p| format!("{}={}", p.experience, p.variant))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<VariantPair> for VariantAssignment {
    fn from_iter<I: IntoIterator<Item = VariantPair>>(iter: I) -> Self {
        let mut assignment = Self::new();
        for pair in iter {
            assignment.push(pair.experience, pair.variant);
        }
        assignment
    }
}

impl std::fmt::Display for VariantAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order() {
        let assignment = VariantAssignment::parse("b=2,a=1");
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.pairs()[0].experience, "b");
        assert_eq!(assignment.to_wire(), "b=2,a=1");
    }

    #[test]
    fn test_parse_skips_malformed() {
        let assignment = VariantAssignment::parse("a=1,,noequals,=x,y=,c=3");
        assert_eq!(assignment.to_wire(), "a=1,c=3");
        assert!(VariantAssignment::parse("").is_empty());
    }

    #[test]
    fn test_push_replaces_same_experience() {
        let mut assignment = VariantAssignment::new();
        assignment.push("a", "1");
        assignment.push("b", "0");
        assignment.push("a", "2");
        assert_eq!(assignment.to_wire(), "a=2,b=0");
        assert_eq!(assignment.variant_for("a"), Some("2"));
        assert_eq!(assignment.variant_for("z"), None);
    }
}
