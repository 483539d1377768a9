//! Locales accepted for name and description localizations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Mapping from locale to localized text.
///
/// A `BTreeMap` keeps serialized definitions stable across compiles.
pub type Localizations = BTreeMap<Locale, String>;

/// Returned when a locale code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale code '{0}'")]
pub struct UnknownLocale(pub String);

macro_rules! locales {
    ( $( $variant:ident => $code:literal, )* ) => {
        /// A locale supported by the remote API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Locale {
            $( $variant, )*
        }

        impl Locale {
            /// Every supported locale, in wire-code order.
            pub const ALL: &'static [Locale] = &[ $( Locale::$variant, )* ];

            /// Returns the locale code, e.g. `"en-US"`.
            pub const fn code(self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )*
                }
            }
        }

        impl FromStr for Locale {
            type Err = UnknownLocale;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $code => Ok(Self::$variant), )*
                    other => Err(UnknownLocale(other.to_string())),
                }
            }
        }
    };
}

locales! {
    Indonesian => "id",
    Danish => "da",
    German => "de",
    EnglishUk => "en-GB",
    EnglishUs => "en-US",
    Spanish => "es-ES",
    SpanishLatam => "es-419",
    French => "fr",
    Croatian => "hr",
    Italian => "it",
    Lithuanian => "lt",
    Hungarian => "hu",
    Dutch => "nl",
    Norwegian => "no",
    Polish => "pl",
    PortugueseBrazilian => "pt-BR",
    Romanian => "ro",
    Finnish => "fi",
    Swedish => "sv-SE",
    Vietnamese => "vi",
    Turkish => "tr",
    Czech => "cs",
    Greek => "el",
    Bulgarian => "bg",
    Russian => "ru",
    Ukrainian => "uk",
    Hindi => "hi",
    Thai => "th",
    ChineseChina => "zh-CN",
    Japanese => "ja",
    ChineseTaiwan => "zh-TW",
    Korean => "ko",
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

/// Builds a [`Localizations`] map from `(locale, text)` pairs.
pub fn localizations<I, S>(entries: I) -> Localizations
where
    I: IntoIterator<Item = (Locale, S)>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|(locale, text)| (locale, text.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for locale in Locale::ALL {
            assert_eq!(locale.code().parse::<Locale>().unwrap(), *locale);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            "xx-YY".parse::<Locale>(),
            Err(UnknownLocale("xx-YY".to_string()))
        );
    }

    #[test]
    fn test_localizations_serialize_as_object() {
        let map = localizations([(Locale::German, "hallo"), (Locale::French, "bonjour")]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "de": "hallo", "fr": "bonjour" }));
    }
}
