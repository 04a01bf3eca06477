use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::metadata::RequestMetadata;
use crate::config::{ConfigMap, ConfigSnapshot, PartnerId, TargetId};

/// Pure resolution logic over one configuration snapshot.
///
/// The snapshot never changes for the lifetime of a resolver; reconfiguring
/// means building a new resolver. Safe to share across threads.
#[derive(Clone, Debug, Default)]
pub struct TargetResolver {
    snapshot: Arc<ConfigSnapshot>,
}

impl TargetResolver {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self { snapshot: Arc::new(snapshot) }
    }

    pub fn from_config(config: ConfigMap) -> Self {
        Self::new(ConfigSnapshot::from_map(config))
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// Whether the request carries any field a target can be searched by.
    pub fn can_service(&self, metadata: &RequestMetadata) -> bool {
        metadata.has_searchable_field()
    }

    /// Targets both selected for general use and enabled in `context`.
    ///
    /// Duplicate markers for the same target count once per kind, so a target
    /// qualifies only when it appears in both sets.
    pub fn resolve_targets(&self, context: &str) -> BTreeSet<TargetId> {
        let selected: HashSet<&TargetId> = self.snapshot.selected().iter().map(|s| &s.target).collect();
        let enabled: HashSet<&TargetId> = self.snapshot.enablements_for(context).map(|e| &e.target).collect();

        let targets: BTreeSet<TargetId> = selected.intersection(&enabled).map(|t| (*t).clone()).collect();
        debug!(
            ui_context = %context,
            selected = selected.len(),
            enabled = enabled.len(),
            resolved = targets.len(),
            "resolved targets"
        );
        targets
    }

    pub fn partner_id(&self, target: &TargetId) -> Option<PartnerId> {
        self.snapshot.partner(target).map(|m| m.partner.clone())
    }

    /// Partner ids for `targets`, sorted and de-duplicated. Targets without a
    /// mapping are skipped.
    pub fn partner_ids<'a>(&self, targets: impl IntoIterator<Item = &'a TargetId>) -> Vec<PartnerId> {
        let mut partners = BTreeSet::new();
        for target in targets {
            match self.partner_id(target) {
                Some(partner) => {
                    partners.insert(partner);
                }
                None => debug!(target_id = %target, "no partner mapping; skipping"),
            }
        }
        partners.into_iter().collect()
    }
}
