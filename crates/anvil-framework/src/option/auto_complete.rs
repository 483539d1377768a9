//! Turning auto-complete results into suggestions.

use anvil_core::{Choice, ChoiceValue};
use serde_json::Value;
use tracing::debug;

use crate::context::AutoCompleteContext;
use crate::error::AutoCompleteError;

/// Most suggestions one reply may carry.
pub const MAX_SUGGESTIONS: usize = 25;

/// A value an auto-complete function may suggest.
///
/// Implemented for the integer and float primitives, text, and
/// [`serde_json::Value`] (numbers and strings only).
pub trait IntoChoiceValue {
    /// Converts into a choice value, or returns the value rendered as text if
    /// it has no choice representation.
    fn into_choice_value(self) -> Result<ChoiceValue, String>;
}

macro_rules! integral {
    ($($ty:ty),*) => {
        $(
            impl IntoChoiceValue for $ty {
                fn into_choice_value(self) -> Result<ChoiceValue, String> {
                    Ok(ChoiceValue::Integer(i64::from(self)))
                }
            }
        )*
    };
}

integral!(i8, i16, i32, i64, u8, u16, u32);

impl IntoChoiceValue for u64 {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        i64::try_from(self)
            .map(ChoiceValue::Integer)
            .map_err(|_| self.to_string())
    }
}

impl IntoChoiceValue for usize {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        i64::try_from(self)
            .map(ChoiceValue::Integer)
            .map_err(|_| self.to_string())
    }
}

impl IntoChoiceValue for f32 {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        Ok(ChoiceValue::Number(f64::from(self)))
    }
}

impl IntoChoiceValue for f64 {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        Ok(ChoiceValue::Number(self))
    }
}

impl IntoChoiceValue for String {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        Ok(ChoiceValue::String(self))
    }
}

impl IntoChoiceValue for &str {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        Ok(ChoiceValue::String(self.to_string()))
    }
}

impl IntoChoiceValue for ChoiceValue {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        Ok(self)
    }
}

impl IntoChoiceValue for Value {
    fn into_choice_value(self) -> Result<ChoiceValue, String> {
        match self {
            Value::String(s) => Ok(ChoiceValue::String(s)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(ChoiceValue::Integer(i)),
                (None, Some(f)) => Ok(ChoiceValue::Number(f)),
                (None, None) => Err(n.to_string()),
            },
            other => Err(other.to_string()),
        }
    }
}

/// Converts `(label, value)` pairs into suggestions, keeping at most
/// [`MAX_SUGGESTIONS`].
pub fn suggestions<I, K, V>(entries: I) -> Result<Vec<Choice>, AutoCompleteError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoChoiceValue,
{
    let mut choices = Vec::new();
    let mut dropped = 0usize;

    for (label, value) in entries {
        let label = label.into();
        let value = value
            .into_choice_value()
            .map_err(|value| AutoCompleteError::UnsupportedValue {
                label: label.clone(),
                value,
            })?;

        if choices.len() < MAX_SUGGESTIONS {
            choices.push(Choice::new(label, value));
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropping auto-complete suggestions over the limit");
    }

    Ok(choices)
}

/// Sends suggestions for the focused option of `ctx`.
pub async fn reply_suggestions(
    ctx: &AutoCompleteContext,
    choices: Vec<Choice>,
) -> Result<(), AutoCompleteError> {
    ctx.reply_choices(&choices).await?;
    Ok(())
}
