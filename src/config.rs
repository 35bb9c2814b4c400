//! Engine configuration.

use serde::Deserialize;

use crate::masters::fields::FieldDefinition;
use crate::types::{EngineError, EngineResult};

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Prefix of engine-assigned voucher numbers.
    #[serde(default = "default_voucher_prefix")]
    pub voucher_prefix: String,
    /// Zero-padded width of the numeric part of engine-assigned voucher numbers.
    #[serde(default = "default_voucher_number_width")]
    pub voucher_number_width: usize,
    /// Custom fields every item may carry.
    #[serde(default)]
    pub item_fields: Vec<FieldDefinition>,
}

fn default_voucher_prefix() -> String {
    "V".to_string()
}

fn default_voucher_number_width() -> usize {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voucher_prefix: default_voucher_prefix(),
            voucher_number_width: default_voucher_number_width(),
            item_fields: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `config/accounts.{toml,json,...}` and
    /// `METAL_ACCOUNTS__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source exists but cannot be parsed.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/accounts")
    }

    /// Same as [`EngineConfig::load`] with an explicit file stem.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("METAL_ACCOUNTS").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Format an engine-assigned voucher number from a posting sequence.
    ///
    /// Numbers compare as strings in ledger order, so a sequence with more
    /// digits than `voucher_number_width` is refused rather than printed
    /// unpadded.
    pub fn voucher_number(&self, sequence: u64) -> EngineResult<String> {
        let digits = sequence.to_string();
        if digits.len() > self.voucher_number_width {
            return Err(EngineError::validation(
                "voucher_no",
                format!(
                    "sequence {} does not fit voucher_number_width {}; supply a voucher number",
                    sequence, self.voucher_number_width
                ),
            ));
        }
        Ok(format!(
            "{}{:0>width$}",
            self.voucher_prefix,
            digits,
            width = self.voucher_number_width
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_sources() {
        let config = EngineConfig::load_from("config/does-not-exist").unwrap();
        assert_eq!(config.voucher_prefix, "V");
        assert_eq!(config.voucher_number_width, 6);
        assert!(config.item_fields.is_empty());
    }

    #[test]
    fn test_voucher_number_format() {
        let config = EngineConfig {
            voucher_prefix: "SL".to_string(),
            voucher_number_width: 4,
            item_fields: Vec::new(),
        };
        assert_eq!(config.voucher_number(7).unwrap(), "SL0007");
        assert_eq!(config.voucher_number(9999).unwrap(), "SL9999");
    }

    #[test]
    fn test_voucher_number_refuses_overflowing_width() {
        let config = EngineConfig {
            voucher_number_width: 1,
            ..EngineConfig::default()
        };
        assert_eq!(config.voucher_number(9).unwrap(), "V9");
        let err = config.voucher_number(10).unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "voucher_no"));
    }
}
