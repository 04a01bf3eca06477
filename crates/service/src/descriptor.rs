//! Service descriptor advertised to the external dispatcher.

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::PartnerId;
use crate::resolver::{RequestMetadata, TargetResolver};

/// Route segment the external search is served under.
pub const SEARCH_ROUTE: &str = "ill_availability_search_z3950";
/// Display name used when none is configured.
pub const DEFAULT_DISPLAY_NAME: &str = "Z39.50";

/// Fixed UI hints for the results table. Identical in every descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingConfig {
    pub server_side: bool,
    pub processing: bool,
    pub paging_type: &'static str,
    pub ordering: bool,
    pub searching: bool,
    pub info: bool,
    pub length_menu: [u32; 4],
}

impl RenderingConfig {
    pub const FIXED: Self = Self {
        server_side: true,
        processing: true,
        paging_type: "full_numbers",
        ordering: false,
        searching: false,
        info: false,
        length_menu: [5, 10, 25, 50],
    };
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self::FIXED
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    id: String,
    name: String,
    endpoint: String,
    enabled: Vec<PartnerId>,
    #[serde(rename = "datatablesConfig")]
    rendering: RenderingConfig,
}

impl ServiceDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn enabled(&self) -> &[PartnerId] {
        &self.enabled
    }

    pub fn rendering(&self) -> &RenderingConfig {
        &self.rendering
    }

    /// Endpoint with the URL-encoded metadata payload appended.
    pub fn invocation_url(&self, metadata: &RequestMetadata) -> String {
        format!("{}{}", self.endpoint, metadata.to_query_payload())
    }
}

/// Result of asking whether this service can handle a request.
///
/// `NotServiceable` is a normal outcome, not an error; it serializes as
/// `false` so callers can tell it apart from a descriptor object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    Serviceable(ServiceDescriptor),
    NotServiceable,
}

impl Availability {
    pub fn is_serviceable(&self) -> bool {
        matches!(self, Self::Serviceable(_))
    }

    pub fn descriptor(&self) -> Option<&ServiceDescriptor> {
        match self {
            Self::Serviceable(d) => Some(d),
            Self::NotServiceable => None,
        }
    }

    pub fn into_descriptor(self) -> Option<ServiceDescriptor> {
        match self {
            Self::Serviceable(d) => Some(d),
            Self::NotServiceable => None,
        }
    }
}

impl Serialize for Availability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Serviceable(d) => d.serialize(serializer),
            Self::NotServiceable => serializer.serialize_bool(false),
        }
    }
}

/// Digest identifying a deployed service version among others.
pub fn service_id(name: &str, version: &str) -> String {
    blake3::hash(format!("{name}{version}").as_bytes()).to_hex().to_string()
}

/// Static service metadata the descriptor is built around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub name: String,
    pub version: String,
    pub api_namespace: String,
}

impl From<&configs::ServiceConfig> for ServiceIdentity {
    fn from(cfg: &configs::ServiceConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            version: cfg.version.clone(),
            api_namespace: cfg.api_namespace.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DescriptorBuilder {
    identity: ServiceIdentity,
    id: String,
    require_metadata_match: bool,
}

impl DescriptorBuilder {
    pub fn new(identity: ServiceIdentity) -> Self {
        let id = service_id(&identity.name, &identity.version);
        Self { identity, id, require_metadata_match: false }
    }

    /// Also answer `NotServiceable` when the metadata has no searchable field.
    pub fn require_metadata_match(mut self, require: bool) -> Self {
        self.require_metadata_match = require;
        self
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn build(&self, resolver: &TargetResolver, metadata: &RequestMetadata, context: &str) -> Availability {
        let searchable = resolver.can_service(metadata);
        if !searchable && self.require_metadata_match {
            debug!(ui_context = %context, "no searchable metadata field");
            return Availability::NotServiceable;
        }

        let targets = resolver.resolve_targets(context);
        if targets.is_empty() {
            debug!(ui_context = %context, searchable, "no target enabled for context");
            return Availability::NotServiceable;
        }

        let enabled = resolver.partner_ids(&targets);
        let name = resolver
            .snapshot()
            .display_name()
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();
        debug!(
            ui_context = %context,
            searchable,
            targets = targets.len(),
            enabled = enabled.len(),
            "service descriptor built"
        );

        Availability::Serviceable(ServiceDescriptor {
            id: self.id.clone(),
            name,
            endpoint: self.endpoint(context),
            enabled,
            rendering: RenderingConfig::FIXED,
        })
    }

    fn endpoint(&self, context: &str) -> String {
        format!(
            "{}/{}?ui_context={}&metadata=",
            self.identity.api_namespace.trim_end_matches('/'),
            SEARCH_ROUTE,
            urlencoding::encode(context)
        )
    }
}
