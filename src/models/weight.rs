use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Pounds per kilogram (exact definition of the avoirdupois pound).
const KILOGRAMS_PER_POUND: f64 = 0.453_592_37;

/// A weight value tagged with its unit.
///
/// Arithmetic normalizes both operands to kilograms (the base mass unit) and
/// tags the result with it. Ordering and equality compare normalized
/// magnitude, so `Weight::new(1.0, Kilograms)` equals its pound conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kilograms,
    Pounds,
}

impl WeightUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kilograms => write!(f, "kilograms"),
            WeightUnit::Pounds => write!(f, "pounds"),
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kilograms" | "kg" => Ok(WeightUnit::Kilograms),
            "pounds" | "lb" | "lbs" => Ok(WeightUnit::Pounds),
            other => Err(format!(
                "Invalid weight unit '{}'. Use kilograms or pounds.",
                other
            )),
        }
    }
}

impl Weight {
    pub const ZERO: Weight = Weight {
        value: 0.0,
        unit: WeightUnit::Kilograms,
    };

    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    pub fn kilograms(value: f64) -> Self {
        Self::new(value, WeightUnit::Kilograms)
    }

    pub fn pounds(value: f64) -> Self {
        Self::new(value, WeightUnit::Pounds)
    }

    /// The magnitude of this weight in kilograms.
    pub fn as_kilograms(&self) -> f64 {
        match self.unit {
            WeightUnit::Kilograms => self.value,
            WeightUnit::Pounds => self.value * KILOGRAMS_PER_POUND,
        }
    }

    pub fn convert_to(&self, unit: WeightUnit) -> Weight {
        if self.unit == unit {
            return *self;
        }
        let value = match unit {
            WeightUnit::Kilograms => self.as_kilograms(),
            WeightUnit::Pounds => self.as_kilograms() / KILOGRAMS_PER_POUND,
        };
        Weight::new(value, unit)
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight::kilograms(self.as_kilograms() + rhs.as_kilograms())
    }
}

impl Sub for Weight {
    type Output = Weight;

    fn sub(self, rhs: Weight) -> Weight {
        Weight::kilograms(self.as_kilograms() - rhs.as_kilograms())
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.as_kilograms() == other.as_kilograms()
    }
}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_kilograms().partial_cmp(&other.as_kilograms())
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.value, self.unit.symbol())
    }
}
