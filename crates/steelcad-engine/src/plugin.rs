//! The `FormatPlugin` trait every format implementation (DSTV and the
//! stubbed others) implements, plus the small value types its contract is
//! built from.

use serde::{Deserialize, Serialize};
use steelcad_core::{Scene, StructuredError};
use steelcad_pipeline::ProcessingContext;

use crate::error::EngineError;

/// Boolean capability matrix for one direction (import or export).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub geometry: bool,
    pub features: bool,
    pub materials: bool,
    pub properties: bool,
    pub hierarchy: bool,
    pub assemblies: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub import: CapabilitySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<CapabilitySet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub extensions: Vec<String>,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
}

/// Outcome of a plugin's content probe, used by the detector to rank
/// candidates and by strict-mode import to decide pass/fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<StructuredError>,
    pub warnings: Vec<StructuredError>,
    /// Confidence this plugin is the right one for the given bytes, in
    /// `[0, 1]`.
    pub confidence: f64,
}

impl ValidationOutcome {
    pub fn valid(confidence: f64) -> Self {
        Self { is_valid: true, errors: Vec::new(), warnings: Vec::new(), confidence }
    }

    pub fn invalid(errors: Vec<StructuredError>) -> Self {
        Self { is_valid: false, errors, warnings: Vec::new(), confidence: 0.0 }
    }
}

/// A pluggable format implementation registered with the engine.
pub trait FormatPlugin: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Semver-shaped version string, e.g. `"1.0.0"`.
    fn version(&self) -> &str;
    fn extensions(&self) -> &[&str];
    fn capabilities(&self) -> Capabilities;

    /// Cheap content probe used by auto-detection; must not mutate
    /// anything and should be fast relative to a full import.
    fn validate(&self, bytes: &[u8]) -> ValidationOutcome;

    /// Runs this plugin's import pipeline, producing a pivot scene.
    /// Non-fatal problems are recorded on `ctx`; only a truly fatal
    /// condition should return `Err`.
    fn import(&self, bytes: &[u8], ctx: &mut ProcessingContext) -> Result<Scene, EngineError>;

    /// Runs this plugin's export pipeline, if it has one. The default
    /// rejects with a capability error; plugins that support export
    /// override this.
    fn export(&self, _scene: &Scene, _ctx: &mut ProcessingContext) -> Result<Vec<u8>, EngineError> {
        Err(EngineError::CapabilityMissing(self.id().to_string(), "export"))
    }

    fn info(&self) -> PluginInfo {
        PluginInfo { id: self.id().to_string(), name: self.name().to_string(), version: self.version().to_string() }
    }

    fn format_info(&self) -> FormatInfo {
        FormatInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            version: self.version().to_string(),
            extensions: self.extensions().iter().map(|s| s.to_string()).collect(),
            capabilities: self.capabilities(),
        }
    }
}

/// Checks the schema a registering plugin must satisfy: non-empty id,
/// extensions beginning with `.`, a parseable semver-shaped version.
pub fn validate_plugin_schema(plugin: &dyn FormatPlugin) -> Result<(), EngineError> {
    let mut fields = Vec::new();

    if plugin.id().trim().is_empty() {
        fields.push("id".to_string());
    }
    if !is_semver_like(plugin.version()) {
        fields.push("version".to_string());
    }
    if plugin.extensions().is_empty() {
        fields.push("extensions".to_string());
    }
    for ext in plugin.extensions() {
        if !ext.starts_with('.') {
            fields.push(format!("extensions[{ext}]"));
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(EngineError::PluginValidationError { fields })
    }
}

fn is_semver_like(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
