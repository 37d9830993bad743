//! Category templates: the configured budget buckets a household fills every month.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A configured budget bucket. Monthly budgets are materialised from templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTemplate {
    pub key: String,
    pub name: String,
    pub kind: CategoryKind,
    pub limit_total: u64,
}

impl CategoryTemplate {
    /// Builds a shared template with no split entries; every user defaults to half.
    pub fn shared(key: impl Into<String>, name: impl Into<String>, limit_total: u64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: CategoryKind::Shared {
                shares: BTreeMap::new(),
            },
            limit_total,
        }
    }

    /// Builds a template owned by a single user.
    pub fn individual(
        key: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        limit_total: u64,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: CategoryKind::Individual {
                owner: owner.into(),
            },
            limit_total,
        }
    }

    /// Adds or replaces the split entry for `user`. No-op for individual templates.
    pub fn with_share(mut self, user: impl Into<String>, share: ShareSpec) -> Self {
        if let CategoryKind::Shared { shares } = &mut self.kind {
            shares.insert(user.into(), share);
        }
        self
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.kind, CategoryKind::Shared { .. })
    }

    /// Shared templates are visible to every user, individual ones only to their owner.
    pub fn is_visible_to(&self, user: &str) -> bool {
        match &self.kind {
            CategoryKind::Shared { .. } => true,
            CategoryKind::Individual { owner } => owner == user,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match &self.kind {
            CategoryKind::Individual { owner } => Some(owner),
            CategoryKind::Shared { .. } => None,
        }
    }

    /// Raw configured split for `user`, if the template is shared and lists the user.
    pub fn share_for(&self, user: &str) -> Option<&ShareSpec> {
        match &self.kind {
            CategoryKind::Shared { shares } => shares.get(user),
            CategoryKind::Individual { .. } => None,
        }
    }
}

/// Ownership model of a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CategoryKind {
    Shared {
        #[serde(default)]
        shares: BTreeMap<String, ShareSpec>,
    },
    Individual {
        owner: String,
    },
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Shared { .. } => "shared",
            CategoryKind::Individual { .. } => "individual",
        };
        f.write_str(label)
    }
}

/// A split percentage exactly as configured: `50`, `0.5`, `"50"` or `"50%"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ShareSpec {
    Number(f64),
    Text(String),
}

impl From<f64> for ShareSpec {
    fn from(value: f64) -> Self {
        ShareSpec::Number(value)
    }
}

impl From<&str> for ShareSpec {
    fn from(value: &str) -> Self {
        ShareSpec::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_follows_ownership() {
        let rent = CategoryTemplate::shared("rent", "Rent", 800_000);
        let gym = CategoryTemplate::individual("gym", "Gym", "ana", 30_000);

        assert!(rent.is_visible_to("ana"));
        assert!(rent.is_visible_to("ben"));
        assert!(gym.is_visible_to("ana"));
        assert!(!gym.is_visible_to("ben"));
        assert_eq!(gym.owner(), Some("ana"));
    }

    #[test]
    fn shares_deserialize_from_numbers_and_strings() {
        let json = r#"{
            "key": "food",
            "name": "Food",
            "kind": {"type": "shared", "shares": {"ana": "60%", "ben": 40}},
            "limit_total": 500000
        }"#;
        let template: CategoryTemplate = serde_json::from_str(json).expect("parse template");

        assert_eq!(
            template.share_for("ana"),
            Some(&ShareSpec::Text("60%".into()))
        );
        assert_eq!(template.share_for("ben"), Some(&ShareSpec::Number(40.0)));
        assert_eq!(template.share_for("carl"), None);
    }
}
