//! Decision-service manifest.

use serde::{Deserialize, Serialize};

use crate::assignment::VariantAssignment;

/// One experience in a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub short_uid: String,
    /// `None` means the visitor is in the control group.
    #[serde(default)]
    pub active_variant_short_uid: Option<String>,
}

/// The decision returned for a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub experiences: Vec<Experience>,
}

impl Manifest {
    /// Variant assignment for the experiences with an active variant.
    pub fn assignment(&self) -> VariantAssignment {
        let mut assignment = VariantAssignment::new();
        for experience in &self.experiences {
            if let Some(variant) = &experience.active_variant_short_uid {
                assignment.push(experience.short_uid.clone(), variant.clone());
            }
        }
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_experiences_omitted() {
        let manifest: Manifest = serde_json::from_value(serde_json::json!({
            "experiences": [
                {"shortUid": "0", "activeVariantShortUid": "1"},
                {"shortUid": "1", "activeVariantShortUid": null},
                {"shortUid": "2"},
                {"shortUid": "3", "activeVariantShortUid": "0"}
            ]
        }))
        .unwrap();
        assert_eq!(manifest.assignment().to_wire(), "0=1,3=0");
    }

    #[test]
    fn test_missing_experiences_is_empty() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.assignment().is_empty());
    }
}
