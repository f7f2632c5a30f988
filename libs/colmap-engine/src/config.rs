use std::path::Path;

use serde::Deserialize;

use colmap_api::Representation;

use crate::error::ConfigError;
use crate::mapper::{TypeMapper, column_name_as, database_type_as};

/// Type mapper configuration, parsed from TOML.
///
/// ```toml
/// defaults = true
///
/// [[types]]
/// representation = "int"
/// names = ["SERIAL", "BIGSERIAL"]
///
/// [[matchers]]
/// column = "id"
/// representation = { nullable = "text" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperConfig {
    /// Start from the standard SQL type table.
    #[serde(default = "default_defaults")]
    pub defaults: bool,

    /// Extra name-table entries, applied in order over the defaults.
    #[serde(default)]
    pub types: Vec<TypeConfig>,

    /// Matchers, in priority order.
    #[serde(default)]
    pub matchers: Vec<MatcherConfig>,
}

fn default_defaults() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            defaults: default_defaults(),
            types: Vec::new(),
            matchers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    pub representation: Representation,
    pub names: Vec<String>,
}

/// Exactly one of `column` / `database_type` must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatcherConfig {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub database_type: Option<String>,
    pub representation: Representation,
}

impl MapperConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            types = config.types.len(),
            matchers = config.matchers.len(),
            "loaded mapper config"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Build the mapper described by this configuration.
    pub fn build(&self) -> Result<TypeMapper, ConfigError> {
        let mut mapper = if self.defaults {
            TypeMapper::default()
        } else {
            TypeMapper::empty()
        };

        for entry in &self.types {
            mapper.register(entry.representation.clone(), entry.names.iter().cloned());
        }

        for (index, entry) in self.matchers.iter().enumerate() {
            let repr = entry.representation.clone();
            let matcher = match (&entry.column, &entry.database_type) {
                (Some(column), None) => column_name_as(column.clone(), repr),
                (None, Some(db_type)) => database_type_as(db_type.clone(), repr),
                (Some(_), Some(_)) => {
                    return Err(ConfigError::InvalidMatcher {
                        index,
                        reason: "set either `column` or `database_type`, not both".into(),
                    });
                }
                (None, None) => {
                    return Err(ConfigError::InvalidMatcher {
                        index,
                        reason: "one of `column` or `database_type` is required".into(),
                    });
                }
            };
            mapper.add_matcher(matcher);
        }

        Ok(mapper)
    }
}
