use serde::Deserialize;

use crate::GenError;

// -----------------------------------------------------------------------------
// GenOptions

/// Generation settings.
///
/// # Examples
///
/// ```
/// use sc_codegen::GenOptions;
///
/// let options = GenOptions::from_json_str(r#"{ "aggregate_required_violations": true }"#).unwrap();
/// assert!(options.aggregate_required_violations);
/// assert_eq!(options.codec_suffix, "Codec");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenOptions {
    /// Report every null required field of a decoded object at once,
    /// instead of only the first one in declaration order.
    pub aggregate_required_violations: bool,
    /// Appended to unit names by the [`Printer`](crate::Printer).
    pub codec_suffix: String,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            aggregate_required_violations: false,
            codec_suffix: String::from("Codec"),
        }
    }
}

impl GenOptions {
    /// Reads options from a JSON object; missing keys keep their default.
    pub fn from_json_str(input: &str) -> Result<Self, GenError> {
        serde_json::from_str(input).map_err(|e| GenError::InvalidOptions(e.to_string()))
    }
}
