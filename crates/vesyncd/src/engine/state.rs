use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// State of a switch entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SwitchState {
    pub on: bool,

    /// Extra attributes such as outlet energy counters, when reported.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// State of a light entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LightState {
    pub on: bool,

    /// Brightness level (0-255), if supported.
    pub brightness: Option<u8>,

    /// Color temperature in Mireds, if supported.
    pub color_temp: Option<u16>,
}

/// State of a fan entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FanState {
    pub on: bool,

    /// Speed as a percentage; None outside manual mode.
    pub percentage: Option<u8>,

    pub preset_mode: Option<String>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// State of a humidifier entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HumidifierState {
    pub on: bool,

    pub mode: Option<String>,

    /// Desired humidity set point, percent.
    pub target_humidity: u8,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// State of a numeric sensor entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SensorState {
    pub value: i64,
}

/// State of a binary sensor entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BinarySensorState {
    pub on: bool,
}

/// State of one entity, tagged by platform.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState {
    Switch(SwitchState),
    Light(LightState),
    Fan(FanState),
    Humidifier(HumidifierState),
    Sensor(SensorState),
    BinarySensor(BinarySensorState),
}

/// Centralized snapshot of all entity states, rebuilt each poll cycle and
/// published atomically.
#[derive(Debug, Clone, Default, Serialize)]
pub struct State {
    pub switches: BTreeMap<String, SwitchState>,
    pub lights: BTreeMap<String, LightState>,
    pub fans: BTreeMap<String, FanState>,
    pub humidifiers: BTreeMap<String, HumidifierState>,
    pub sensors: BTreeMap<String, SensorState>,
    pub binary_sensors: BTreeMap<String, BinarySensorState>,
}

impl State {
    pub fn insert(&mut self, entity_id: String, state: EntityState) {
        match state {
            EntityState::Switch(s) => {
                self.switches.insert(entity_id, s);
            }
            EntityState::Light(s) => {
                self.lights.insert(entity_id, s);
            }
            EntityState::Fan(s) => {
                self.fans.insert(entity_id, s);
            }
            EntityState::Humidifier(s) => {
                self.humidifiers.insert(entity_id, s);
            }
            EntityState::Sensor(s) => {
                self.sensors.insert(entity_id, s);
            }
            EntityState::BinarySensor(s) => {
                self.binary_sensors.insert(entity_id, s);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.switches.len()
            + self.lights.len()
            + self.fans.len()
            + self.humidifiers.len()
            + self.sensors.len()
            + self.binary_sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
