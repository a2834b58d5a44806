//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Line rating evaluation and grid-wide loading analysis."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Serde helpers for loading percentages. A line with no thermal capacity has
//! infinite loading, written as JSON `null` and read back as `f64::INFINITY`.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

/// For `Option<f64>` fields declared with `default` and
/// `skip_serializing_if = "Option::is_none"`: an absent field is `None`,
/// `null` is `Some(INFINITY)`.
pub mod optional {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        #[serde(with = "crate::loading")]
        pct: f64,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "crate::loading::optional")]
        peak: Option<f64>,
    }

    #[test]
    fn infinite_loading_survives_json() {
        let sample = Sample {
            pct: f64::INFINITY,
            peak: Some(f64::INFINITY),
        };
        let raw = serde_json::to_string(&sample).unwrap();
        assert_eq!(raw, r#"{"pct":null,"peak":null}"#);
        assert_eq!(serde_json::from_str::<Sample>(&raw).unwrap(), sample);
    }

    #[test]
    fn finite_and_absent_values_are_unchanged() {
        let sample = Sample {
            pct: 57.25,
            peak: None,
        };
        let raw = serde_json::to_string(&sample).unwrap();
        assert_eq!(raw, r#"{"pct":57.25}"#);
        assert_eq!(serde_json::from_str::<Sample>(&raw).unwrap(), sample);
    }
}
