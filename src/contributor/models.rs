use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// The fixed set of synthetic contributor personas
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SyntheticVariant {
    Rooh,
    Sukhan,
}

impl SyntheticVariant {
    pub fn username(&self) -> &'static str {
        match self {
            SyntheticVariant::Rooh => "rooh_ai",
            SyntheticVariant::Sukhan => "sukhan_ai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SyntheticVariant::Rooh => "Rooh AI",
            SyntheticVariant::Sukhan => "Sukhan AI",
        }
    }

    pub fn bio(&self) -> &'static str {
        match self {
            SyntheticVariant::Rooh => {
                "A soul wandering through verses, painting emotions in English prose."
            }
            SyntheticVariant::Sukhan => "शब्दों का जादूगर, हिंदी में भावनाओं को उकेरता है।",
        }
    }

    /// Language tag written onto works generated for this variant
    pub fn language(&self) -> &'static str {
        match self {
            SyntheticVariant::Rooh => "english",
            SyntheticVariant::Sukhan => "hindi",
        }
    }
}

/// Database model for contributors table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorModel {
    pub id: String, // UUID v4 as string
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_synthetic: bool,
    pub synthetic_variant: Option<SyntheticVariant>,
    pub created_at: DateTime<Utc>,
}

impl ContributorModel {
    /// Creates a regular (human) contributor
    pub fn new(username: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            display_name,
            avatar_url: None,
            bio: None,
            is_synthetic: false,
            synthetic_variant: None,
            created_at: Utc::now(),
        }
    }

    /// Creates the synthetic contributor backing a variant
    pub fn synthetic(variant: SyntheticVariant) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: variant.username().to_string(),
            display_name: Some(variant.display_name().to_string()),
            avatar_url: None,
            bio: Some(variant.bio().to_string()),
            is_synthetic: true,
            synthetic_variant: Some(variant),
            created_at: Utc::now(),
        }
    }

    /// Key used when reporting per-contributor results: the variant tag for
    /// synthetic contributors, the username otherwise
    pub fn report_key(&self) -> String {
        self.synthetic_variant
            .map(|variant| variant.to_string())
            .unwrap_or_else(|| self.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_variant_round_trips_through_tag() {
        for variant in SyntheticVariant::iter() {
            let tag = variant.to_string();
            assert_eq!(SyntheticVariant::from_str(&tag).unwrap(), variant);
        }
        assert!(SyntheticVariant::from_str("ghalib").is_err());
    }

    #[test]
    fn test_synthetic_contributor_carries_variant_metadata() {
        let contributor = ContributorModel::synthetic(SyntheticVariant::Sukhan);

        assert!(contributor.is_synthetic);
        assert_eq!(contributor.username, "sukhan_ai");
        assert_eq!(contributor.display_name.as_deref(), Some("Sukhan AI"));
        assert_eq!(contributor.report_key(), "sukhan");
    }

    #[test]
    fn test_human_contributor_report_key_is_username() {
        let contributor = ContributorModel::new("mirza".to_string(), None);

        assert!(!contributor.is_synthetic);
        assert_eq!(contributor.synthetic_variant, None);
        assert_eq!(contributor.report_key(), "mirza");
    }
}
