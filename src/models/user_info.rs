use serde::{Deserialize, Serialize};

use super::weight::WeightUnit;

/// Per-device user settings. Exactly one instance exists per store; it is
/// created lazily on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub weight_preference: WeightPreference,
    /// True if the companion app was known to be installed by the end of the
    /// previous sync session. Flipped after the initial full sync completes.
    pub was_companion_installed: bool,
    pub aggregation_method: AggregationMethod,
}

/// The user's weight-unit preference. `System` defers to the device default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPreference {
    System,
    Kilograms,
    Pounds,
}

impl WeightPreference {
    pub fn weight_unit(&self) -> WeightUnit {
        match self {
            WeightPreference::System => system_weight_unit(),
            WeightPreference::Kilograms => WeightUnit::Kilograms,
            WeightPreference::Pounds => WeightUnit::Pounds,
        }
    }
}

impl std::fmt::Display for WeightPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightPreference::System => write!(f, "system"),
            WeightPreference::Kilograms => write!(f, "kilograms"),
            WeightPreference::Pounds => write!(f, "pounds"),
        }
    }
}

impl std::str::FromStr for WeightPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(WeightPreference::System),
            "kilograms" | "kg" => Ok(WeightPreference::Kilograms),
            "pounds" | "lb" | "lbs" => Ok(WeightPreference::Pounds),
            other => Err(format!(
                "Invalid weight preference '{}'. Use system, kilograms, or pounds.",
                other
            )),
        }
    }
}

/// How per-session weights are reduced for trend display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// Every completed weight value from every set.
    #[default]
    All,
    Median,
    Average,
    Max,
    Min,
}

impl std::fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggregationMethod::All => "all",
            AggregationMethod::Median => "median",
            AggregationMethod::Average => "average",
            AggregationMethod::Max => "max",
            AggregationMethod::Min => "min",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for AggregationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(AggregationMethod::All),
            "median" => Ok(AggregationMethod::Median),
            "average" | "mean" => Ok(AggregationMethod::Average),
            "max" => Ok(AggregationMethod::Max),
            "min" => Ok(AggregationMethod::Min),
            other => Err(format!(
                "Invalid aggregation method '{}'. Use all, median, average, max, or min.",
                other
            )),
        }
    }
}

/// There is no OS locale surface worth depending on here; the system
/// default is kilograms.
fn system_weight_unit() -> WeightUnit {
    WeightUnit::Kilograms
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            weight_preference: WeightPreference::System,
            was_companion_installed: false,
            aggregation_method: AggregationMethod::All,
        }
    }
}

impl UserInfo {
    pub fn weight_unit(&self) -> WeightUnit {
        self.weight_preference.weight_unit()
    }

    /// Adopts the preference and companion flag from a reference. The
    /// aggregation method is device-local and is not copied.
    pub fn apply(&mut self, reference: &UserInfo) {
        self.weight_preference = reference.weight_preference;
        self.was_companion_installed = reference.was_companion_installed;
    }

    pub fn reset_weight_unit(&mut self) {
        self.weight_preference = WeightPreference::System;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let info = UserInfo::default();
        assert_eq!(info.weight_preference, WeightPreference::System);
        assert!(!info.was_companion_installed);
        assert_eq!(info.aggregation_method, AggregationMethod::All);
        assert_eq!(info.weight_unit(), WeightUnit::Kilograms);
    }

    #[test]
    fn test_apply_keeps_aggregation_method() {
        let mut local = UserInfo {
            aggregation_method: AggregationMethod::Median,
            ..UserInfo::default()
        };
        let remote = UserInfo {
            weight_preference: WeightPreference::Pounds,
            was_companion_installed: true,
            aggregation_method: AggregationMethod::Max,
        };
        local.apply(&remote);
        assert_eq!(local.weight_preference, WeightPreference::Pounds);
        assert!(local.was_companion_installed);
        assert_eq!(local.aggregation_method, AggregationMethod::Median);

        local.reset_weight_unit();
        assert_eq!(local.weight_preference, WeightPreference::System);
    }

    #[test]
    fn test_wire_keys() {
        let json = serde_json::to_value(UserInfo::default()).unwrap();
        assert_eq!(json["weightPreference"], "system");
        assert_eq!(json["wasCompanionInstalled"], false);
        assert_eq!(json["aggregationMethod"], "all");
    }
}
