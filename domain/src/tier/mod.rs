//! Billing tiers and the classes of adapter each may bind to.
//!
//! | Tier kind | Allowed adapter classes |
//! |-----------|-------------------------|
//! | free | free |
//! | subscription | subscription, free |
//! | metered | subscription, metered, free |
//!
//! A subscription tier must never reach a metered adapter. Definitions
//! that would allow it are rejected, and a binding that breaks it is a
//! [`DomainError::BillingInvariantViolation`].

use crate::core::backend::AdapterClass;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a tier is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierBilling {
    Free,
    Subscription,
    Metered,
}

impl TierBilling {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierBilling::Free => "free",
            TierBilling::Subscription => "subscription",
            TierBilling::Metered => "metered",
        }
    }

    /// Default classes for this billing kind, in resolution preference order
    pub fn default_classes(&self) -> Vec<AdapterClass> {
        match self {
            TierBilling::Free => vec![AdapterClass::Free],
            TierBilling::Subscription => vec![AdapterClass::Subscription, AdapterClass::Free],
            TierBilling::Metered => vec![
                AdapterClass::Subscription,
                AdapterClass::Metered,
                AdapterClass::Free,
            ],
        }
    }

    /// Hard ceiling on what a billing kind may ever bind to
    fn permits(&self, class: AdapterClass) -> bool {
        match self {
            TierBilling::Free => class == AdapterClass::Free,
            TierBilling::Subscription => class != AdapterClass::Metered,
            TierBilling::Metered => true,
        }
    }
}

impl std::fmt::Display for TierBilling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tier definition as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub billing: TierBilling,
    /// Narrow or reorder the default classes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<AdapterClass>>,
}

/// A validated tier (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: String,
    pub billing: TierBilling,
    pub allowed: Vec<AdapterClass>,
}

impl Tier {
    pub fn new(id: impl Into<String>, definition: TierDefinition) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidTier("tier id is empty".to_string()));
        }
        let allowed = definition
            .allowed
            .unwrap_or_else(|| definition.billing.default_classes());
        if allowed.is_empty() {
            return Err(DomainError::InvalidTier(format!("{}: no adapter classes allowed", id)));
        }
        if let Some(bad) = allowed.iter().find(|c| !definition.billing.permits(**c)) {
            return Err(DomainError::InvalidTier(format!(
                "{} ({} tier) may not bind {} adapters",
                id, definition.billing, bad
            )));
        }
        Ok(Self {
            id,
            billing: definition.billing,
            allowed,
        })
    }

    pub fn permits(&self, class: AdapterClass) -> bool {
        self.billing.permits(class) && self.allowed.contains(&class)
    }

    /// Check a concrete adapter class against this tier
    pub fn check(&self, class: AdapterClass) -> Result<(), DomainError> {
        if self.permits(class) {
            Ok(())
        } else {
            Err(DomainError::BillingInvariantViolation(format!(
                "tier '{}' ({}) may not use a {} adapter",
                self.id, self.billing, class
            )))
        }
    }
}

/// The set of known tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    tiers: BTreeMap<String, Tier>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        let builtin = [
            ("free", TierBilling::Free),
            ("pro", TierBilling::Subscription),
            ("metered", TierBilling::Metered),
        ];
        let tiers = builtin
            .into_iter()
            .map(|(id, billing)| {
                let allowed = billing.default_classes();
                (
                    id.to_string(),
                    Tier {
                        id: id.to_string(),
                        billing,
                        allowed,
                    },
                )
            })
            .collect();
        Self { tiers }
    }
}

impl TierPolicy {
    /// Built-in tiers plus custom definitions; any invalid definition fails.
    pub fn with_definitions<I>(definitions: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (String, TierDefinition)>,
    {
        let mut policy = Self::default();
        for (id, definition) in definitions {
            let tier = Tier::new(id.clone(), definition)?;
            policy.tiers.insert(id, tier);
        }
        Ok(policy)
    }

    pub fn get(&self, id: &str) -> Result<&Tier, DomainError> {
        self.tiers
            .get(id)
            .ok_or_else(|| DomainError::InvalidIdentifier(format!("unknown tier '{}'", id)))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tiers() {
        let policy = TierPolicy::default();
        let pro = policy.get("pro").unwrap();
        assert!(pro.permits(AdapterClass::Subscription));
        assert!(pro.permits(AdapterClass::Free));
        assert!(!pro.permits(AdapterClass::Metered));

        let free = policy.get("free").unwrap();
        assert!(!free.permits(AdapterClass::Subscription));

        let metered = policy.get("metered").unwrap();
        assert!(metered.permits(AdapterClass::Metered));
    }

    #[test]
    fn test_subscription_with_metered_is_rejected() {
        let err = Tier::new(
            "team",
            TierDefinition {
                billing: TierBilling::Subscription,
                allowed: Some(vec![AdapterClass::Subscription, AdapterClass::Metered]),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTier(msg) if msg.contains("metered")));
    }

    #[test]
    fn test_check_violation() {
        let policy = TierPolicy::default();
        let err = policy.get("pro").unwrap().check(AdapterClass::Metered).unwrap_err();
        assert!(err.is_billing_violation());
        assert!(policy.get("pro").unwrap().check(AdapterClass::Free).is_ok());
    }

    #[test]
    fn test_custom_definitions() {
        let policy = TierPolicy::with_definitions([(
            "local".to_string(),
            TierDefinition {
                billing: TierBilling::Metered,
                allowed: Some(vec![AdapterClass::Free]),
            },
        )])
        .unwrap();
        let local = policy.get("local").unwrap();
        assert!(!local.permits(AdapterClass::Metered));
        assert_eq!(policy.ids().count(), 4);
    }

    #[test]
    fn test_unknown_tier() {
        let err = TierPolicy::default().get("gold").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_definition_from_toml_like_json() {
        let def: TierDefinition =
            serde_json::from_str(r#"{"billing": "subscription", "allowed": ["free"]}"#).unwrap();
        let tier = Tier::new("student", def).unwrap();
        assert_eq!(tier.allowed, vec![AdapterClass::Free]);
    }
}
