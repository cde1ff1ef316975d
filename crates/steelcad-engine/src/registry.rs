//! The plugin registry: registration, deterministic candidate ordering,
//! and content-based format detection.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::EngineError;
use crate::plugin::{validate_plugin_schema, Capabilities, FormatInfo, FormatPlugin};

/// Read-mostly collection of registered format plugins, kept in
/// registration order so detection ties break deterministically on the
/// order plugins were added, never on iteration order of a map.
///
/// Plugins are held behind `Arc` rather than `Box` so `Engine::import` can
/// hand an owned, `'static` handle to a detached worker thread instead of
/// borrowing through `&self` for the plugin's whole (possibly long-running)
/// `import` call.
pub struct FormatRegistry {
    plugins: Vec<Arc<dyn FormatPlugin>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self { plugins: Vec::new() }
    }

    pub fn register_format(&mut self, plugin: Box<dyn FormatPlugin>) -> Result<(), EngineError> {
        validate_plugin_schema(plugin.as_ref())?;
        if self.plugins.iter().any(|p| p.id() == plugin.id()) {
            return Err(EngineError::DuplicatePlugin(plugin.id().to_string()));
        }
        info!(format = plugin.id(), "registering format plugin");
        self.plugins.push(Arc::from(plugin));
        Ok(())
    }

    pub fn unregister_format(&mut self, id: &str) -> Result<(), EngineError> {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.id() != id);
        if self.plugins.len() == before {
            return Err(EngineError::UnknownFormat(id.to_string()));
        }
        Ok(())
    }

    pub fn supported_formats(&self) -> Vec<FormatInfo> {
        self.plugins.iter().map(|p| p.format_info()).collect()
    }

    pub fn capabilities(&self, id: &str) -> Option<Capabilities> {
        self.plugin(id).map(|p| p.capabilities())
    }

    pub fn plugin(&self, id: &str) -> Option<Arc<dyn FormatPlugin>> {
        self.plugins.iter().find(|p| p.id() == id).cloned()
    }

    /// Phase 1: extension filter. Phase 2: content probing among the
    /// survivors, highest confidence above `threshold` wins.
    pub fn detect_format(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
        threshold: f64,
    ) -> Result<String, EngineError> {
        let candidates: Vec<&Arc<dyn FormatPlugin>> = match extension {
            Some(ext) => {
                let matches: Vec<_> = self
                    .plugins
                    .iter()
                    .filter(|p| p.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
                    .collect();
                if matches.is_empty() {
                    self.plugins.iter().collect()
                } else {
                    matches
                }
            }
            None => self.plugins.iter().collect(),
        };

        let mut scored: Vec<(String, f64)> = Vec::new();
        let mut best: Option<(&str, f64)> = None;
        for plugin in &candidates {
            let outcome = plugin.validate(bytes);
            scored.push((plugin.id().to_string(), outcome.confidence));
            if outcome.is_valid && outcome.confidence >= threshold {
                if best.map(|(_, c)| outcome.confidence > c).unwrap_or(true) {
                    best = Some((plugin.id(), outcome.confidence));
                }
            }
        }

        match best {
            Some((id, confidence)) => {
                info!(format = id, confidence, "format detected");
                Ok(id.to_string())
            }
            None => {
                warn!(?scored, "could not detect format above threshold");
                Err(EngineError::CannotDetectFormat { candidates: scored })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
