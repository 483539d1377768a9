//! Options carrying structured values encoded as text.
//!
//! The wire has no notion of enums or structured values, so these options
//! are registered as text. Each choice value is the JSON encoding of the
//! Rust value; the submitted text is decoded back on access.

use anvil_core::{Choice, CommandChoice, Localizations, OptionType};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use super::{CommandOption, TypedOption, pipeline};
use crate::error::{OptionError, OptionResult};
use crate::value::ParsedValue;

/// Encodes a value as choice text.
pub fn encode_choice<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Decodes submitted text into `T`.
///
/// Text that is already a JSON string literal, object, or array is decoded
/// as-is, falling back to the text as a string for free-typed input such as
/// `[draft] notes`. Anything else is first read as the content of a string
/// literal, since the remote side may deliver `Heads` where `"Heads"` was
/// registered; if that fails, the raw text is decoded as JSON (covering
/// numbers and booleans).
pub fn decode_choice<T: DeserializeOwned>(option: &str, text: &str) -> OptionResult<T> {
    let trimmed = text.trim();
    let is_literal = (trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"'))
        || trimmed.starts_with('{')
        || trimmed.starts_with('[');

    let decode_err = |e: serde_json::Error| OptionError::Decode {
        option: option.to_string(),
        reason: e.to_string(),
    };

    if is_literal {
        return serde_json::from_str(trimmed).or_else(|literal_err| {
            serde_json::from_value(Value::String(text.to_string()))
                .map_err(|_| decode_err(literal_err))
        });
    }

    serde_json::from_value(Value::String(text.to_string())).or_else(|quoted_err| {
        serde_json::from_str(trimmed).map_err(|_| decode_err(quoted_err))
    })
}

/// Builder for options whose value is any serializable `T`, sent as text.
pub struct ChoiceOption<T> {
    inner: TypedOption<T>,
}

impl<T> ChoiceOption<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let option = CommandOption::new(name, description, OptionType::String);
        let decode = pipeline(|name, raw| match raw {
            None => Ok(None),
            Some(ParsedValue::String(text)) => decode_choice::<T>(name, text).map(Some),
            Some(other) => Err(OptionError::TypeMismatch {
                option: name.to_string(),
                expected: OptionType::String,
                found: other.option_type(),
            }),
        });

        Self {
            inner: TypedOption::from_parts(option, decode),
        }
    }

    /// Offers `value` under `label`.
    ///
    /// A value that cannot be encoded is recorded and reported when the
    /// command is compiled.
    pub fn choice(self, label: impl Into<String>, value: T) -> Self {
        self.push(label.into(), &value, Localizations::new())
    }

    /// Offers `value` under `label` with localized labels.
    pub fn choice_localized(
        self,
        label: impl Into<String>,
        value: T,
        localizations: Localizations,
    ) -> Self {
        self.push(label.into(), &value, localizations)
    }

    /// Offers several values.
    pub fn choices<I, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
    {
        for (label, value) in choices {
            self = self.push(label.into(), &value, Localizations::new());
        }
        self
    }

    fn push(mut self, label: String, value: &T, localizations: Localizations) -> Self {
        match encode_choice(value) {
            Ok(text) => self
                .inner
                .option
                .push_choice(Choice::new(label, text).with_localizations(localizations)),
            Err(e) => {
                error!(
                    option = %self.inner.option.name,
                    choice = %label,
                    error = %e,
                    "Failed to encode choice"
                );
                self.inner.option.unencodable.push(label);
            }
        }
        self
    }
}

impl<E: CommandChoice> ChoiceOption<E> {
    /// Creates an option offering every member of `E`, labelled with its
    /// canonical name.
    pub fn with_members(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut builder = Self::new(name, description);
        for member in E::members() {
            builder = builder.push(
                member.canonical_name().to_string(),
                &member,
                Localizations::new(),
            );
        }
        builder
    }
}

forward_typed!(impl[T: Serialize + DeserializeOwned + Send + Sync + 'static] ChoiceOption<T> => T);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{IntoOption, ReadOption};
    use anvil_core::ChoiceValue;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    enum Coin {
        Heads,
        Tails,
    }

    impl CommandChoice for Coin {
        fn members() -> Vec<Self> {
            vec![Coin::Heads, Coin::Tails]
        }

        fn canonical_name(&self) -> &'static str {
            match self {
                Coin::Heads => "Heads",
                Coin::Tails => "Tails",
            }
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_members_prefill_choices() {
        let (schema, _) = ChoiceOption::<Coin>::with_members("side", "Coin side").into_option();
        let data = schema.build();

        assert_eq!(data.kind, OptionType::String);
        assert_eq!(data.choices.len(), 2);
        assert_eq!(data.choices[0].name, "Heads");
        assert_eq!(data.choices[0].value, ChoiceValue::String("\"Heads\"".into()));
    }

    #[test]
    fn test_enum_round_trip() {
        let (schema, handle) =
            ChoiceOption::<Coin>::with_members("side", "Coin side").into_option();

        for member in Coin::members() {
            let ChoiceValue::String(text) = &schema
                .choices()
                .iter()
                .find(|c| c.name == member.canonical_name())
                .unwrap()
                .value
            else {
                panic!("enum choices are text");
            };
            let raw = ParsedValue::String(text.clone());
            assert_eq!(handle.read(Some(&raw)).unwrap(), member);
        }
    }

    #[test]
    fn test_decode_quoted_and_unquoted() {
        assert_eq!(decode_choice::<Coin>("side", "\"Tails\"").unwrap(), Coin::Tails);
        assert_eq!(decode_choice::<Coin>("side", "Tails").unwrap(), Coin::Tails);
        assert_eq!(decode_choice::<u32>("n", "42").unwrap(), 42);
        assert_eq!(
            decode_choice::<Point>("p", r#"{"x":1,"y":2}"#).unwrap(),
            Point { x: 1, y: 2 }
        );
        assert!(matches!(
            decode_choice::<Coin>("side", "Edge"),
            Err(OptionError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_bracketed_free_text() {
        assert_eq!(
            decode_choice::<String>("q", "[draft] notes").unwrap(),
            "[draft] notes"
        );
        assert_eq!(
            decode_choice::<String>("q", "{braces}").unwrap(),
            "{braces}"
        );
        assert_eq!(
            decode_choice::<String>("q", "\"quoted\"").unwrap(),
            "quoted"
        );
        assert!(matches!(
            decode_choice::<Point>("p", "{broken"),
            Err(OptionError::Decode { reason, .. }) if reason.contains("line 1")
        ));
    }

    #[test]
    fn test_serializable_choice() {
        let data = ChoiceOption::<Point>::new("p", "A point")
            .choice("origin", Point { x: 0, y: 0 })
            .schema()
            .build();
        assert_eq!(
            data.choices[0].value,
            ChoiceValue::String(r#"{"x":0,"y":0}"#.into())
        );
    }

    #[test]
    fn test_unencodable_choice_is_recorded() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1u8);
        let opt = ChoiceOption::<BTreeMap<Vec<u8>, u8>>::new("m", "A map").choice("bad", bad);

        assert!(opt.schema().choices().is_empty());
        assert_eq!(opt.schema().unencodable, vec!["bad".to_string()]);
    }
}
