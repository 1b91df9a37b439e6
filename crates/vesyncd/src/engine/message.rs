use serde::Deserialize;
use serde::Serialize;

/// A command addressed to one entity.
///
/// Values are in presentation units; the receiving entity remaps them to the
/// vendor's scales before anything goes on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Command {
    TurnOn,
    TurnOff,
    /// Brightness level, 0-255.
    SetBrightness(u8),
    /// Color temperature in Mireds.
    SetColorTemp(u16),
    /// Speed percentage; zero turns the entity off.
    SetPercentage(u8),
    SetMode(String),
    /// Target humidity percentage.
    SetTargetHumidity(u8),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("no entity with id {0}")]
    UnknownEntity(String),

    #[error("entity {entity_id} does not support {action}")]
    Unsupported {
        entity_id: String,
        action: &'static str,
    },

    #[error("invalid preset mode {0}")]
    InvalidPresetMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: Command =
            serde_json::from_str(r#"{"action": "set_brightness", "value": 128}"#).unwrap();
        assert_eq!(command, Command::SetBrightness(128));

        let command: Command = serde_json::from_str(r#"{"action": "turn_on"}"#).unwrap();
        assert_eq!(command, Command::TurnOn);

        let command: Command =
            serde_json::from_str(r#"{"action": "set_mode", "value": "sleep"}"#).unwrap();
        assert_eq!(command, Command::SetMode("sleep".to_string()));
    }
}
