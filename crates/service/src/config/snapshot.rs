use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::keys::ConfigKey;
use super::ConfigMap;

/// Opaque identifier of a remote search target.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

/// Identifier the calling system uses to track a target.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(pub String);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for PartnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectedTarget {
    pub target: TargetId,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextEnablement {
    pub context: String,
    pub target: TargetId,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartnerMapping {
    pub target: TargetId,
    pub partner: PartnerId,
}

/// Immutable, typed view of one configuration blob.
///
/// Built once per load. Values are trimmed and empty values dropped, so an
/// entry with an empty value behaves exactly like a missing key.
#[derive(Clone, Debug, Default)]
pub struct ConfigSnapshot {
    raw: ConfigMap,
    selected: Vec<SelectedTarget>,
    enablements: Vec<ContextEnablement>,
    partners: BTreeMap<TargetId, PartnerMapping>,
    display_name: Option<String>,
}

impl ConfigSnapshot {
    pub fn from_map(raw: ConfigMap) -> Self {
        let mut selected = Vec::new();
        let mut enablements = Vec::new();
        let mut partners = BTreeMap::new();
        let mut display_name = None;

        for (key, value) in &raw {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match ConfigKey::classify(key) {
                ConfigKey::TargetSelect => selected.push(SelectedTarget { target: value.into() }),
                ConfigKey::ContextDisplay { context } => enablements.push(ContextEnablement {
                    context: context.to_string(),
                    target: value.into(),
                }),
                ConfigKey::Partner { target } => {
                    let target = TargetId::from(target);
                    partners.insert(
                        target.clone(),
                        PartnerMapping { target, partner: value.into() },
                    );
                }
                ConfigKey::DisplayName => display_name = Some(value.to_string()),
                ConfigKey::Other => {}
            }
        }

        Self { raw, selected, enablements, partners, display_name }
    }

    /// The blob this snapshot was parsed from.
    pub fn raw(&self) -> &ConfigMap {
        &self.raw
    }

    pub fn selected(&self) -> &[SelectedTarget] {
        &self.selected
    }

    /// Enablements whose context is exactly `context`.
    pub fn enablements_for<'a>(&'a self, context: &'a str) -> impl Iterator<Item = &'a ContextEnablement> + 'a {
        self.enablements.iter().filter(move |e| e.context == context)
    }

    pub fn partner(&self, target: &TargetId) -> Option<&PartnerMapping> {
        self.partners.get(target)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}
