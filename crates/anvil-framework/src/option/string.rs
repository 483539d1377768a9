use anvil_core::{Choice, Localizations};

use super::TypedOption;

/// Builder for text options.
pub struct StringOption {
    inner: TypedOption<String>,
}

impl StringOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            inner: TypedOption::new(name, description),
        }
    }

    /// Offers a fixed `(label, value)` pair.
    pub fn choice(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner
            .option
            .push_choice(Choice::new(label, value.into()));
        self
    }

    /// Offers a fixed pair with localized labels.
    pub fn choice_localized(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
        localizations: Localizations,
    ) -> Self {
        self.inner
            .option
            .push_choice(Choice::new(label, value.into()).with_localizations(localizations));
        self
    }

    /// Offers several fixed pairs.
    pub fn choices<I, L, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        for (label, value) in choices {
            self.inner
                .option
                .push_choice(Choice::new(label, value.into()));
        }
        self
    }

    /// Bounds the input length, in characters.
    pub fn length(mut self, min: u16, max: u16) -> Self {
        self.inner.option.set_length(Some(min), Some(max));
        self
    }

    pub fn min_length(mut self, min: u16) -> Self {
        self.inner.option.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u16) -> Self {
        self.inner.option.max_length = Some(max);
        self
    }
}

forward_typed!(impl[] StringOption => String);
