//! Compiler configuration.
//!
//! A workspace configures compilation with a `klass.yaml` file:
//!
//! ```yaml
//! apiVersion: klass/v1
//! kind: CompilerConfig
//! warningsAsErrors: false
//! inference:
//!   temporalProperties: true
//!   serviceCriteria: true
//! maxMacroDepth: 8
//! reportUnreferencedPrivate: true
//! sourceExtension: klass.json
//! ```
//!
//! Every field is optional and falls back to [`CompilerConfig::default`].

use std::path::Path;

use klass_resolve::ResolveOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up in a source directory.
pub const CONFIG_FILE_NAME: &str = "klass.yaml";

const API_VERSION: &str = "klass/v1";
const KIND: &str = "CompilerConfig";

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the configuration YAML.
    #[error("failed to parse config YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid apiVersion: expected 'klass/v1', got '{0}'")]
    InvalidApiVersion(String),

    #[error("invalid kind: expected 'CompilerConfig', got '{0}'")]
    InvalidKind(String),

    /// A field holds a value outside its allowed range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings of one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// API version for compatibility checking.
    pub api_version: String,

    /// Kind must be "CompilerConfig".
    pub kind: String,

    /// Report warnings as errors, which also withholds the model.
    pub warnings_as_errors: bool,

    /// Which inference phases run.
    pub inference: InferenceConfig,

    /// How deeply macro expansions may nest before compilation aborts.
    pub max_macro_depth: u32,

    /// Warn about private properties that nothing references.
    pub report_unreferenced_private: bool,

    /// File name suffix of serialized source trees, without the leading dot.
    pub source_extension: String,
}

/// Switches for the inference phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    pub temporal_properties: bool,
    pub service_criteria: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            temporal_properties: true,
            service_criteria: true,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let options = ResolveOptions::default();
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            warnings_as_errors: false,
            inference: InferenceConfig::default(),
            max_macro_depth: options.max_macro_depth,
            report_unreferenced_private: options.report_unreferenced_private,
            source_extension: "klass.json".to_string(),
        }
    }
}

impl CompilerConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `klass.yaml` from `dir` if present, otherwise the defaults.
    pub fn load_or_default(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading compiler config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: CompilerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the schema header and value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_version != API_VERSION {
            return Err(ConfigError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ConfigError::InvalidKind(self.kind.clone()));
        }
        if self.max_macro_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxMacroDepth",
                reason: "must be at least 1".to_string(),
            });
        }
        let extension = self.source_extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "sourceExtension",
                reason: format!("'{}' is not a file name suffix", self.source_extension),
            });
        }
        Ok(())
    }

    /// The suffix source files must end with, including the leading dot.
    pub fn source_suffix(&self) -> String {
        format!(".{}", self.source_extension.trim_start_matches('.'))
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            temporal_properties: self.inference.temporal_properties,
            service_criteria: self.inference.service_criteria,
            max_macro_depth: self.max_macro_depth,
            report_unreferenced_private: self.report_unreferenced_private,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
apiVersion: klass/v1
kind: CompilerConfig
warningsAsErrors: true
inference:
  serviceCriteria: false
maxMacroDepth: 4
"#;
        let config = CompilerConfig::from_yaml(yaml).unwrap();
        assert!(config.warnings_as_errors);
        assert!(config.inference.temporal_properties);
        assert!(!config.inference.service_criteria);

        let options = config.resolve_options();
        assert_eq!(options.max_macro_depth, 4);
        assert!(!options.service_criteria);
        assert!(options.report_unreferenced_private);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = CompilerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert_eq!(config.source_suffix(), ".klass.json");
    }

    #[test]
    fn test_invalid_api_version() {
        let yaml = "apiVersion: klass/v2\nkind: CompilerConfig\n";
        let result = CompilerConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigError::InvalidApiVersion(_))));
    }

    #[test]
    fn test_invalid_kind() {
        let yaml = "apiVersion: klass/v1\nkind: Scenario\n";
        let result = CompilerConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigError::InvalidKind(_))));
    }

    #[test]
    fn test_zero_macro_depth_is_rejected() {
        let result = CompilerConfig::from_yaml("maxMacroDepth: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "maxMacroDepth",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_field_type_is_yaml_error() {
        let result = CompilerConfig::from_yaml("warningsAsErrors: sometimes\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }
}
