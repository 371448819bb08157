//! Registry configuration.
//!
//! A task builds its registry from a `RegistryConfig`, either in code or
//! from a JSON document produced by the surrounding configuration system.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Name of the owning monitoring task.
    pub task_name: String,
    /// Implementation class of the owning task.
    pub task_class: String,
    /// Detector code the task reports for.
    pub detector_name: String,
    /// Id of a parallel task instance, 0 if there is only one.
    pub parallel_task_id: u32,
    /// Max number of published objects; `None` means unbounded.
    pub max_objects: Option<usize>,
    /// Objects for which the export layer keeps moving windows.
    pub moving_windows: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            task_name: "task".to_string(),
            task_class: String::new(),
            detector_name: "TST".to_string(),
            parallel_task_id: 0,
            max_objects: None,
            moving_windows: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Config for a named task, everything else default.
    #[must_use]
    pub fn for_task(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` for malformed JSON, `ConfigError::InvalidField`
    /// if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks field constraints.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidField` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.task_name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "task_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_objects == Some(0) {
            return Err(ConfigError::InvalidField {
                field: "max_objects".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RegistryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = RegistryConfig::from_json_str(
            r#"{"task_name": "RawDataQcTask", "detector_name": "CTP", "max_objects": 64}"#,
        )
        .unwrap();
        assert_eq!(cfg.task_name, "RawDataQcTask");
        assert_eq!(cfg.detector_name, "CTP");
        assert_eq!(cfg.max_objects, Some(64));
        assert_eq!(cfg.parallel_task_id, 0);
        assert!(cfg.moving_windows.is_empty());
    }

    #[test]
    fn test_rejects_empty_task_name() {
        let err = RegistryConfig::from_json_str(r#"{"task_name": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "task_name"));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = RegistryConfig::from_json_str(r#"{"max_objects": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "max_objects"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = RegistryConfig::from_json_str("{task_name").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"task_name": "Tracks", "moving_windows": ["hPt"]}}"#).unwrap();
        drop(file);

        let cfg = RegistryConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.task_name, "Tracks");
        assert_eq!(cfg.moving_windows, vec!["hPt".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
