//! Built-in value validators

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::RequestContext;

use super::errors::ValidationError;
use super::spec::ValueValidator;

/// Bounds on the length of a string (in characters), list or object.
///
/// Values without a length are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Length {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl Length {
    pub fn min(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn exactly(len: usize) -> Self {
        Self::between(len, len)
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), None) => format!("at least {}", min),
            (None, Some(max)) => format!("at most {}", max),
            (Some(min), Some(max)) if min == max => format!("exactly {}", min),
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (None, None) => "anything".to_string(),
        }
    }
}

impl ValueValidator for Length {
    fn validate(
        &self,
        _ctx: &RequestContext,
        value: &Value,
        _data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => return Ok(()),
        };

        let too_short = self.min.is_some_and(|min| len < min);
        let too_long = self.max.is_some_and(|max| len > max);
        if too_short || too_long {
            return Err(ValidationError::new(format!(
                "Length must be {}, but was {}.",
                self.describe(),
                len
            )));
        }
        Ok(())
    }
}

/// Inclusive bounds on a numeric value. Non-numbers are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumberRange {
    pub fn min(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), None) => format!("at least {}", min),
            (None, Some(max)) => format!("at most {}", max),
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (None, None) => "any number".to_string(),
        }
    }
}

impl ValueValidator for NumberRange {
    fn validate(
        &self,
        _ctx: &RequestContext,
        value: &Value,
        _data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        let Some(number) = value.as_f64() else {
            return Ok(());
        };

        let too_small = self.min.is_some_and(|min| number < min);
        let too_large = self.max.is_some_and(|max| number > max);
        if too_small || too_large {
            return Err(ValidationError::new(format!("Must be {}.", self.describe())));
        }
        Ok(())
    }
}

/// The value must equal a sibling input value, e.g. a password confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirm {
    pub other: String,
}

impl Confirm {
    pub fn new(other: impl Into<String>) -> Self {
        Self {
            other: other.into(),
        }
    }
}

impl ValueValidator for Confirm {
    fn validate(
        &self,
        _ctx: &RequestContext,
        value: &Value,
        data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        if data.get(&self.other) != Some(value) {
            return Err(ValidationError::new(format!(
                "Must equal the value given in '{}'.",
                self.other
            )));
        }
        Ok(())
    }
}
