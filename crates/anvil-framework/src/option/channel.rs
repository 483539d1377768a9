use anvil_core::{Channel, ChannelType};

use super::TypedOption;

/// Builder for channel options.
pub struct ChannelOption {
    inner: TypedOption<Channel>,
}

impl ChannelOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            inner: TypedOption::new(name, description),
        }
    }

    /// Restricts the channel kinds the caller may pick.
    pub fn types(mut self, types: impl IntoIterator<Item = ChannelType>) -> Self {
        self.inner
            .option
            .set_channel_types(types.into_iter().collect());
        self
    }
}

forward_typed!(impl[] ChannelOption => Channel);

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::OptionType;

    #[test]
    fn test_channel_types() {
        let data = ChannelOption::new("where", "Target channel")
            .types([ChannelType::GuildText, ChannelType::PublicThread])
            .schema()
            .build();

        assert_eq!(data.kind, OptionType::Channel);
        assert_eq!(
            data.channel_types,
            vec![ChannelType::GuildText, ChannelType::PublicThread]
        );
    }
}
