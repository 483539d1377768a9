use anvil_core::{Choice, Localizations};

use super::TypedOption;
use crate::value::NumberKind;

/// Builder for integer (`i64`) and floating-point (`f64`) options.
pub struct NumberOption<N> {
    inner: TypedOption<N>,
}

impl<N: NumberKind> NumberOption<N> {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            inner: TypedOption::new(name, description),
        }
    }

    /// Bounds the accepted value, inclusive on both ends.
    ///
    /// Bounds are enforced by the remote side; values delivered anyway are
    /// passed through unchanged.
    pub fn range(mut self, min: N, max: N) -> Self {
        self.inner
            .option
            .set_range(Some(min.into()), Some(max.into()));
        self
    }

    pub fn min(mut self, min: N) -> Self {
        self.inner.option.min_value = Some(min.into());
        self
    }

    pub fn max(mut self, max: N) -> Self {
        self.inner.option.max_value = Some(max.into());
        self
    }

    /// Offers a fixed `(label, value)` pair.
    pub fn choice(mut self, label: impl Into<String>, value: N) -> Self {
        self.inner.option.push_choice(Choice::new(label, value));
        self
    }

    /// Offers a fixed pair with localized labels.
    pub fn choice_localized(
        mut self,
        label: impl Into<String>,
        value: N,
        localizations: Localizations,
    ) -> Self {
        self.inner
            .option
            .push_choice(Choice::new(label, value).with_localizations(localizations));
        self
    }

    /// Offers several fixed pairs.
    pub fn choices<I, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (L, N)>,
        L: Into<String>,
    {
        for (label, value) in choices {
            self.inner.option.push_choice(Choice::new(label, value));
        }
        self
    }
}

forward_typed!(impl[N: NumberKind] NumberOption<N> => N);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{IntoOption, ReadOption};
    use crate::value::ParsedValue;
    use anvil_core::{ChoiceValue, Number, OptionType};

    #[test]
    fn test_integer_range() {
        let (schema, handle) = NumberOption::<i64>::new("n", "A number")
            .range(1, 10)
            .into_option();

        let data = schema.build();
        assert_eq!(data.kind, OptionType::Integer);
        assert_eq!(data.min_value, Some(Number::Integer(1)));
        assert_eq!(data.max_value, Some(Number::Integer(10)));

        assert_eq!(handle.read(Some(&ParsedValue::Integer(5))).unwrap(), 5);
        // out-of-range values are not re-validated
        assert_eq!(handle.read(Some(&ParsedValue::Integer(15))).unwrap(), 15);
    }

    #[test]
    fn test_number_choices() {
        let data = NumberOption::<f64>::new("ratio", "A ratio")
            .choices([("half", 0.5), ("whole", 1.0)])
            .min(0.0)
            .schema()
            .build();

        assert_eq!(data.kind, OptionType::Number);
        assert_eq!(data.choices[0].value, ChoiceValue::Number(0.5));
        assert_eq!(data.min_value, Some(Number::Float(0.0)));
        assert_eq!(data.max_value, None);
    }
}
