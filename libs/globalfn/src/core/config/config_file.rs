// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Function configuration via `globalfn.yaml`.

use std::path::Path;

use serde::Deserialize;

use crate::core::descriptor::ConfigValue;
use crate::core::error::{GlobalFnError, Result};

/// One `path: value` entry. A sequence value is spread into positional
/// arguments only when written as `{ args: [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Args { args: Vec<serde_json::Value> },
    Single(serde_json::Value),
}

impl SettingValue {
    pub fn into_args(self) -> Vec<ConfigValue> {
        match self {
            Self::Args { args } => args.into_iter().map(ConfigValue::from_json).collect(),
            Self::Single(serde_json::Value::Null) => Vec::new(),
            Self::Single(value) => vec![ConfigValue::from_json(value)],
        }
    }
}

/// Contents of a `globalfn.yaml` file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Dotted configuration paths, applied in file order.
    #[serde(default, with = "ordered_settings")]
    pub settings: Vec<(String, SettingValue)>,
}

impl ConfigFile {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "globalfn.yaml";

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            GlobalFnError::Configuration(format!("Failed to parse {}: {}", Self::FILE_NAME, e))
        })
    }

    /// Load from a directory. Returns an error if the file is missing or
    /// cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            GlobalFnError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let file = Self::from_yaml_str(&content)?;
        tracing::info!(
            "Loaded {} settings from {}",
            file.settings.len(),
            config_path.display()
        );
        Ok(file)
    }
}

/// YAML mappings keep their order through `serde_yaml::Mapping`.
mod ordered_settings {
    use serde::{Deserialize, Deserializer};

    use super::SettingValue;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, SettingValue)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
        mapping
            .into_iter()
            .map(|(key, value)| {
                let key = key
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| serde::de::Error::custom("setting keys must be strings"))?;
                let value = serde_yaml::from_value(value).map_err(serde::de::Error::custom)?;
                Ok((key, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_keep_file_order() {
        let file = ConfigFile::from_yaml_str(
            r#"
settings:
  tensorrt.use_int8: true
  tensorrt.int8_calibration: /data/calib
  concurrency_width: 64
"#,
        )
        .unwrap();
        let keys: Vec<&str> = file.settings.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["tensorrt.use_int8", "tensorrt.int8_calibration", "concurrency_width"]
        );
    }

    #[test]
    fn test_setting_values_become_args() {
        let file = ConfigFile::from_yaml_str(
            r#"
settings:
  enable_cudnn:
  stage_partition_scope_ids: [1, 2]
  train.model_update_conf: { momentum_conf: { beta: 0.8 } }
  static_mem_alloc_policy_white_list.add: { args: [use_time_line_algo] }
"#,
        )
        .unwrap();
        let args: Vec<Vec<ConfigValue>> =
            file.settings.into_iter().map(|(_, v)| v.into_args()).collect();
        assert!(args[0].is_empty());
        assert_eq!(
            args[1],
            vec![ConfigValue::List(vec![ConfigValue::Int(1), ConfigValue::Int(2)])]
        );
        assert!(matches!(args[2].as_slice(), [ConfigValue::Structured(_)]));
        assert_eq!(args[3], vec![ConfigValue::from("use_time_line_algo")]);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ConfigFile::load(dir.path()),
            Err(GlobalFnError::Configuration(_))
        ));
    }
}
