//! Wire-level command definitions submitted for registration.

use serde::{Deserialize, Serialize};

use super::choice::{Choice, Number};
use super::kind::{ChannelType, CommandType, OptionType};
use super::locale::Localizations;

fn is_false(v: &bool) -> bool {
    !*v
}

/// The wire definition of a single option, sub-command, or sub-command group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Localizations::is_empty")]
    pub name_localizations: Localizations,
    #[serde(default, skip_serializing_if = "Localizations::is_empty")]
    pub description_localizations: Localizations,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub autocomplete: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    /// Nested options; only used by sub-commands and groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
}

impl OptionData {
    /// Creates a bare definition with no constraints.
    pub fn new(kind: OptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            required: false,
            autocomplete: false,
            choices: Vec::new(),
            channel_types: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            options: Vec::new(),
        }
    }
}

/// The wire definition of a top-level application command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub name: String,
    /// Empty for context-menu commands.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Localizations::is_empty")]
    pub name_localizations: Localizations,
    #[serde(default, skip_serializing_if = "Localizations::is_empty")]
    pub description_localizations: Localizations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionData>,
    /// Permission bit set, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nsfw: bool,
}

impl CommandData {
    /// Creates a bare definition of the given kind.
    pub fn new(kind: CommandType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            options: Vec::new(),
            default_member_permissions: None,
            dm_permission: None,
            nsfw: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_data_skips_defaults() {
        let data = OptionData::new(OptionType::Integer, "sides", "Number of sides");
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            json!({ "type": 4, "name": "sides", "description": "Number of sides" })
        );
    }

    #[test]
    fn test_command_data_shape() {
        let mut option = OptionData::new(OptionType::Integer, "sides", "Number of sides");
        option.required = true;
        option.min_value = Some(Number::Integer(2));
        option.max_value = Some(Number::Integer(100));

        let mut command = CommandData::new(CommandType::ChatInput, "roll", "Roll a die");
        command.options.push(option);
        command.dm_permission = Some(false);

        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            json!({
                "type": 1,
                "name": "roll",
                "description": "Roll a die",
                "options": [{
                    "type": 4,
                    "name": "sides",
                    "description": "Number of sides",
                    "required": true,
                    "min_value": 2,
                    "max_value": 100
                }],
                "dm_permission": false
            })
        );
    }
}
