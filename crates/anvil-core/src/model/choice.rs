//! Choices and numeric bounds.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::kind::OptionType;
use super::locale::Localizations;

/// The value half of a [`Choice`].
///
/// Untagged on the wire: integers, doubles, and strings are distinguished by
/// their JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Integer(i64),
    Number(f64),
    String(String),
}

impl ChoiceValue {
    /// The option wire type this value belongs to.
    pub const fn option_type(&self) -> OptionType {
        match self {
            Self::Integer(_) => OptionType::Integer,
            Self::Number(_) => OptionType::Number,
            Self::String(_) => OptionType::String,
        }
    }

    /// Returns `true` if a choice with this value may be attached to an
    /// option of `kind`.
    ///
    /// Integer values are accepted on number options since every integer
    /// choice is also a valid number on the wire.
    pub fn fits(&self, kind: OptionType) -> bool {
        matches!(
            (self, kind),
            (Self::Integer(_), OptionType::Integer | OptionType::Number)
                | (Self::Number(_), OptionType::Number)
                | (Self::String(_), OptionType::String)
        )
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for ChoiceValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ChoiceValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for ChoiceValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ChoiceValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// A predefined `(label, value)` pair offered instead of free-form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the caller.
    pub name: String,
    /// Localized labels.
    #[serde(default, skip_serializing_if = "Localizations::is_empty")]
    pub name_localizations: Localizations,
    /// Value submitted when the choice is picked.
    pub value: ChoiceValue,
}

impl Choice {
    /// Creates a choice without localizations.
    pub fn new(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            name: name.into(),
            name_localizations: Localizations::new(),
            value: value.into(),
        }
    }

    /// Replaces the localized labels.
    pub fn with_localizations(mut self, localizations: Localizations) -> Self {
        self.name_localizations = localizations;
        self
    }
}

/// A numeric bound (`min_value` / `max_value`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A closed set of values offered as choices on a text option.
///
/// Implemented by `#[derive(CommandChoice)]` for field-less enums. Each
/// member is offered with its canonical name as label and its JSON encoding
/// as wire value, so decoding the submitted text with `serde_json` yields the
/// member back.
pub trait CommandChoice: Serialize + DeserializeOwned + Sized + Send + Sync + 'static {
    /// All members, in declaration order.
    fn members() -> Vec<Self>;

    /// The canonical name of this member.
    fn canonical_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_choice_value_untagged() {
        assert_eq!(serde_json::to_value(ChoiceValue::Integer(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(ChoiceValue::Number(1.5)).unwrap(), json!(1.5));
        assert_eq!(
            serde_json::from_value::<ChoiceValue>(json!("x")).unwrap(),
            ChoiceValue::String("x".into())
        );
        assert_eq!(
            serde_json::from_value::<ChoiceValue>(json!(7)).unwrap(),
            ChoiceValue::Integer(7)
        );
    }

    #[test]
    fn test_fits() {
        assert!(ChoiceValue::Integer(1).fits(OptionType::Number));
        assert!(!ChoiceValue::Number(1.0).fits(OptionType::Integer));
        assert!(!ChoiceValue::String("a".into()).fits(OptionType::Boolean));
    }

    #[test]
    fn test_choice_omits_empty_localizations() {
        let json = serde_json::to_value(Choice::new("Apple", 1i64)).unwrap();
        assert_eq!(json, json!({ "name": "Apple", "value": 1 }));
    }
}
