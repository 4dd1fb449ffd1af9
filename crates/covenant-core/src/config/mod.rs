use crate::customization::Customization;
use crate::errors::ConfigError;
use crate::synth::format::count_placeholders;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Startup configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Reject overrides for operation ids that no descriptor declares.
    /// Default: false (warn and register anyway).
    pub strict_registration: bool,

    /// Registered overrides, keyed by operation id.
    pub customizations: BTreeMap<String, Customization>,
}

impl EngineConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)
            .map_err(|e| ConfigError(format!("failed to parse yaml: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&source)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (operation_id, customization) in &self.customizations {
            if operation_id.trim().is_empty() {
                return Err(ConfigError("customization key is empty".to_string()));
            }
            if let Some(format) = &customization.format {
                if format.is_empty() {
                    return Err(ConfigError(format!(
                        "customizations.{operation_id}.format is empty"
                    )));
                }
            }
            if let Some(order) = &customization.argument_order {
                if order.is_empty() {
                    return Err(ConfigError(format!(
                        "customizations.{operation_id}.argument_order is empty"
                    )));
                }
                if let Some(format) = &customization.format {
                    let placeholders = count_placeholders(format);
                    if placeholders != order.len() {
                        return Err(ConfigError(format!(
                            "customizations.{operation_id}: format has {placeholders} placeholders \
                             but argument_order has {} codes",
                            order.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
