//! Registration boundary: `ill_availability_services` plus whole-blob reloads.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Deserializer};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{ConfigMap, ConfigSource};
use crate::descriptor::{Availability, DescriptorBuilder};
use crate::errors::ServiceError;
use crate::observability::{CONFIG_RELOADS_TOTAL, DESCRIPTORS_BUILT_TOTAL, NOT_SERVICEABLE_TOTAL};
use crate::resolver::{RequestMetadata, TargetResolver};

/// Parameters of one availability question.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServicesParams {
    #[serde(default)]
    pub metadata: RequestMetadata,
    #[serde(default, deserialize_with = "lenient_context")]
    pub ui_context: String,
}

/// A context that is not a JSON string becomes the empty context, which no
/// configuration key can enable.
fn lenient_context<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Holds the current resolver and the collaborator its configuration comes from.
///
/// Requests read whichever resolver is current when they start. Reconfiguring
/// loads or saves a whole blob, builds a new resolver and swaps it in.
pub struct AvailabilityService {
    source: Arc<dyn ConfigSource>,
    resolver: ArcSwap<TargetResolver>,
    builder: DescriptorBuilder,
    // serializes save + swap so the file and the live resolver agree
    write_lock: Mutex<()>,
}

impl AvailabilityService {
    /// Load the configuration once. A load failure is fatal to construction.
    pub async fn load(source: Arc<dyn ConfigSource>, builder: DescriptorBuilder) -> Result<Self, ServiceError> {
        let config = source.load().await?;
        info!(keys = config.len(), service = %builder.identity().name, "availability service configured");
        Ok(Self {
            source,
            resolver: ArcSwap::from_pointee(TargetResolver::from_config(config)),
            builder,
            write_lock: Mutex::new(()),
        })
    }

    pub fn resolver(&self) -> Arc<TargetResolver> {
        self.resolver.load_full()
    }

    /// Answer with a descriptor, or `NotServiceable` when no target fits.
    pub fn ill_availability_services(&self, params: &ServicesParams) -> Availability {
        let resolver = self.resolver.load();
        let out = self.builder.build(&resolver, &params.metadata, &params.ui_context);
        match &out {
            Availability::Serviceable(d) => {
                DESCRIPTORS_BUILT_TOTAL.inc();
                debug!(ui_context = %params.ui_context, enabled = d.enabled().len(), "service advertised");
            }
            Availability::NotServiceable => {
                NOT_SERVICEABLE_TOTAL.inc();
                debug!(ui_context = %params.ui_context, "service not advertised");
            }
        }
        out
    }

    /// The blob the current resolver was built from.
    pub fn current_config(&self) -> ConfigMap {
        self.resolver.load().snapshot().raw().clone()
    }

    /// Re-read the blob from the collaborator and swap in a new resolver.
    /// On failure the current resolver stays in place.
    pub async fn reload(&self) -> Result<usize, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let config = self.source.load().await?;
        Ok(self.swap(config))
    }

    /// Persist `config` as the whole new blob, then swap in a resolver built from it.
    /// On failure nothing is swapped.
    pub async fn replace_config(&self, config: ConfigMap) -> Result<usize, ServiceError> {
        if config.keys().any(|k| k.trim().is_empty()) {
            return Err(ServiceError::Validation("configuration keys must not be blank".into()));
        }
        let _guard = self.write_lock.lock().await;
        self.source.save(&config).await?;
        Ok(self.swap(config))
    }

    fn swap(&self, config: ConfigMap) -> usize {
        let keys = config.len();
        self.resolver.store(Arc::new(TargetResolver::from_config(config)));
        CONFIG_RELOADS_TOTAL.inc();
        info!(keys, "configuration snapshot swapped");
        keys
    }
}
