use serde::{Deserialize, Serialize};
use steelcad_core::{Scene, StructuredError};

use crate::plugin::PluginInfo;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Explicit format id; skips detection but validation still runs.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportStats {
    pub total_elements: u64,
    pub imported_elements: u64,
    pub failed_elements: u64,
    pub processing_time_ms: u64,
    pub file_size: u64,
    pub memory_used: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportMetadata {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub plugin: Option<PluginInfo>,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default)]
    pub scene: Option<Scene>,
    pub errors: Vec<StructuredError>,
    pub warnings: Vec<StructuredError>,
    pub stats: ImportStats,
    pub metadata: ImportMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<u8>>,
    #[serde(default)]
    pub filename: Option<String>,
    pub errors: Vec<StructuredError>,
    pub warnings: Vec<StructuredError>,
    pub stats: ImportStats,
}
