use crate::error::{ConfigError, FormatError};
use crate::grammar::TypeTag;
use crate::parser::Parser;
use crate::serializer::{dump, serialize};
use crate::value::{ConfigMap, Value};
use indexmap::IndexSet;
use log::warn;
use serde::{Serialize, Serializer};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const DEFINITION_DV: &str = "DEFINITION_DV";

/// A parsed config file together with the path it was read from.
///
/// Keys keep the order of the source file; keys added later are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    filename: Option<PathBuf>,
    values: ConfigMap,
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl From<ConfigMap> for Config {
    fn from(values: ConfigMap) -> Self {
        Self {
            filename: None,
            values,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the config file at `path`, remembering the path for
    /// [`Config::save`].
    ///
    /// # Errors
    /// Returns a `ConfigError` if the file cannot be read or is malformed.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Ok(Self {
            filename: Some(path.to_path_buf()),
            values: read_config(path)?,
        })
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn values(&self) -> &ConfigMap {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ConfigMap {
        &mut self.values
    }

    #[must_use]
    pub fn into_map(self) -> ConfigMap {
        self.values
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Rewrites the file at `path`, using its current content as the template.
    /// Returns the keys that had no line in the file.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the file cannot be read or replaced, or a
    /// value cannot be formatted.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<IndexSet<String>, ConfigError> {
        write_config(path, &self.values)
    }

    /// Writes back to the file this config was read from.
    ///
    /// # Errors
    /// Returns `ConfigError::NoFilename` for a config that was not read from
    /// a file, otherwise as [`Config::write`].
    pub fn save(&self) -> Result<IndexSet<String>, ConfigError> {
        let path = self.filename.as_deref().ok_or(ConfigError::NoFilename)?;
        self.write(path)
    }

    /// Writes every key to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the file cannot be written or a value
    /// cannot be formatted.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        dump_config(path, &self.values)
    }

    /// Expands a design vector into the `DV_*` keys the solver reads. Each
    /// entry is multiplied by the matching `DEFINITION_DV` scale; `dv_old`
    /// defaults to zeros.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingKey` without a `DEFINITION_DV`, and
    /// `ConfigError::DesignVectorLength` if a vector does not have one entry
    /// per design variable.
    pub fn unpack_design_variables(
        &mut self,
        dv_new: &[f64],
        dv_old: Option<&[f64]>,
    ) -> Result<(), ConfigError> {
        let definition = match self.values.get(DEFINITION_DV) {
            Some(Value::DesignVariables(definition)) => definition.clone(),
            Some(other) => {
                return Err(FormatError::ValueShape {
                    key: DEFINITION_DV.to_string(),
                    expected: TypeTag::DesignVariableDefinition,
                    found: other.kind_name(),
                }
                .into())
            }
            None => {
                return Err(ConfigError::MissingKey {
                    key: DEFINITION_DV.to_string(),
                })
            }
        };
        let n = definition
            .len()
            .ok_or_else(|| FormatError::DesignVariableShape {
                key: DEFINITION_DV.to_string(),
            })?;

        let zeros = vec![0.0; n];
        let dv_old = dv_old.unwrap_or(&zeros[..]);
        for vector in [dv_new, dv_old] {
            if vector.len() != n {
                return Err(ConfigError::DesignVectorLength {
                    expected: n,
                    found: vector.len(),
                });
            }
        }

        let scaled = |vector: &[f64]| -> Vec<f64> {
            vector
                .iter()
                .zip(&definition.scale)
                .map(|(value, scale)| value * scale)
                .collect()
        };
        let dv_new = scaled(dv_new);
        let dv_old = scaled(dv_old);
        let markers = definition.marker.first().cloned().unwrap_or_default();

        self.values
            .insert("DV_KIND".to_string(), Value::StringList(definition.kind));
        self.values
            .insert("DV_MARKER".to_string(), Value::StringList(markers));
        self.values
            .insert("DV_PARAM".to_string(), Value::FloatListList(definition.param));
        self.values
            .insert("DV_VALUE_OLD".to_string(), Value::FloatList(dv_old));
        self.values
            .insert("DV_VALUE_NEW".to_string(), Value::FloatList(dv_new));
        Ok(())
    }

    /// Serializes the parameters into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the parameters into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Reads and parses the config file at `path`. Diagnostics are labelled
/// with the path.
///
/// # Errors
/// Returns a `ConfigError` if the file cannot be read or is malformed.
pub fn read_config(path: impl AsRef<Path>) -> Result<ConfigMap, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let values = Parser::new_with_name(&source, path.display().to_string()).parse_document()?;
    Ok(values)
}

/// Rewrites the config file at `path` with `values`, using the file's
/// current content as the template. Keys with no line in the file are
/// logged and returned.
///
/// # Errors
/// Returns a `ConfigError` if the file cannot be read or replaced, or a
/// value cannot be formatted.
pub fn write_config(
    path: impl AsRef<Path>,
    values: &ConfigMap,
) -> Result<IndexSet<String>, ConfigError> {
    let path = path.as_ref();
    let template = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let serialized = serialize(&template, values)?;
    for key in &serialized.unwritten {
        warn!(
            "Parameter {key} not found in config file {} and was not written",
            path.display()
        );
    }
    replace_file(path, &serialized.text)?;
    Ok(serialized.unwritten)
}

/// Writes a fresh config file at `path` holding every key of `values`.
///
/// # Errors
/// Returns a `ConfigError` if the file cannot be written or a value cannot
/// be formatted.
pub fn dump_config(path: impl AsRef<Path>, values: &ConfigMap) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let serialized = dump(values)?;
    for key in &serialized.unwritten {
        warn!("Parameter {key} cannot be written as a config line");
    }
    replace_file(path, &serialized.text)
}

/// Writes to a temporary file next to `path`, then moves it over `path`.
fn replace_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|source| io_error(path, source))?;
    file.write_all(contents.as_bytes())
        .map_err(|source| io_error(path, source))?;
    file.persist(path)
        .map_err(|err| io_error(path, err.error))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_unpack_design_variables_scales_vectors() {
        let values = parse(
            "DEFINITION_DV= ( 1, 0.5 | airfoil | 0, 0.05 ); ( 1, 2.0 | airfoil | 1, 0.5 )\n",
        )
        .unwrap();
        let mut config = Config::from(values);

        config
            .unpack_design_variables(&[1.0, 3.0], Some(&[2.0, 4.0]))
            .unwrap();

        assert_eq!(
            config.get("DV_KIND"),
            Some(&Value::StringList(vec!["HICKS_HENNE".into(), "HICKS_HENNE".into()]))
        );
        assert_eq!(
            config.get("DV_MARKER"),
            Some(&Value::StringList(vec!["airfoil".into()]))
        );
        assert_eq!(
            config.get("DV_PARAM"),
            Some(&Value::FloatListList(vec![vec![0.0, 0.05], vec![1.0, 0.5]]))
        );
        assert_eq!(config.get("DV_VALUE_NEW"), Some(&Value::FloatList(vec![0.5, 6.0])));
        assert_eq!(config.get("DV_VALUE_OLD"), Some(&Value::FloatList(vec![1.0, 8.0])));
    }

    #[test]
    fn test_unpack_design_variables_defaults_old_to_zero() {
        let mut config = Config::from(parse("DEFINITION_DV= ( 102, 1.0 | airfoil )").unwrap());
        config.unpack_design_variables(&[2.0], None).unwrap();
        assert_eq!(config.get("DV_VALUE_OLD"), Some(&Value::FloatList(vec![0.0])));
    }

    #[test]
    fn test_unpack_design_variables_errors() {
        let mut config = Config::new();
        assert!(matches!(
            config.unpack_design_variables(&[1.0], None),
            Err(ConfigError::MissingKey { .. })
        ));

        let mut config = Config::from(parse("DEFINITION_DV= ( 102, 1.0 | airfoil )").unwrap());
        assert!(matches!(
            config.unpack_design_variables(&[1.0, 2.0], None),
            Err(ConfigError::DesignVectorLength {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_save_requires_filename() {
        assert!(matches!(Config::new().save(), Err(ConfigError::NoFilename)));
    }

    #[test]
    fn test_to_json_keeps_file_order() {
        let config = Config::from(parse("MACH_NUMBER= 0.8\nEXT_ITER= 10\nDECOMPOSED= NO\n").unwrap());
        let json = config.to_json().unwrap();
        let mach = json.find("MACH_NUMBER").unwrap();
        let iter = json.find("EXT_ITER").unwrap();
        assert!(mach < iter);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({ "MACH_NUMBER": 0.8, "EXT_ITER": 10, "DECOMPOSED": false })
        );
    }
}
