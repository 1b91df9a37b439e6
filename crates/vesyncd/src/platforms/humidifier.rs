use linkme::distributed_slice;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use super::Platform;
use super::PLATFORM_REGISTRY;
use crate::engine::entity_id;
use crate::engine::state::EntityState;
use crate::engine::state::HumidifierState;
use crate::engine::CapabilityBucket;
use crate::engine::CommandError;
use crate::engine::Entity;
use crate::engine::EntityBase;
use crate::engine::HumidityAdjustable;
use crate::engine::ModeAdjustable;
use crate::engine::Toggleable;
use crate::vesync::Device;
use crate::vesync::VendorCall;

const PLATFORM: &str = "humidifier";

const MODE_AUTO: &str = "auto";
const MODE_SLEEP: &str = "sleep";
const MANUAL_LOW: &str = "manual low";
const MANUAL_MID: &str = "manual mid";
const MANUAL_HIGH: &str = "manual high";

/// Manual mist levels behind the three named manual modes.
const MIST_LOW: u8 = 3;
const MIST_MID: u8 = 6;
const MIST_HIGH: u8 = 9;

const MIN_HUMIDITY: u8 = 30;
const MAX_HUMIDITY: u8 = 80;

const HUMIDIFIER_MODELS: &[&str] = &["Classic300S", "Dual200S", "Dual301S", "LUH-D301S-WEU"];

const PRESET_MODES: &[&str] = &[MODE_AUTO, MODE_SLEEP, MANUAL_LOW, MANUAL_MID, MANUAL_HIGH];

/// Detail keys surfaced as state attributes when present.
const HUMIDIFIER_ATTRIBUTES: &[&str] = &[
    "humidity",
    "mist_virtual_level",
    "mist_level",
    "water_lacks",
    "humidity_high",
    "water_tank_lifted",
    "automatic_stop_reach_target",
];

pub struct HumidifierPlatform;

#[distributed_slice(PLATFORM_REGISTRY)]
fn new_humidifier_platform() -> Box<dyn Platform> {
    Box::new(HumidifierPlatform)
}

impl Platform for HumidifierPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn bucket(&self) -> CapabilityBucket {
        CapabilityBucket::Humidifiers
    }

    fn recognizes(&self, device_type: &str) -> bool {
        HUMIDIFIER_MODELS.contains(&device_type)
    }

    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        for device in devices {
            if self.recognizes(&device.device_type) {
                entities.push(Box::new(HumidifierEntity {
                    base: EntityBase::new(device.clone()),
                }));
            } else {
                warn!(
                    device_name = %device.device_name,
                    device_type = %device.device_type,
                    "unknown device type"
                );
            }
        }
        entities
    }
}

struct HumidifierEntity {
    base: EntityBase,
}

impl HumidifierEntity {
    /// The vendor reports "manual" without a level; the named manual mode is
    /// recovered from the virtual mist level.
    fn mode(&self) -> Option<String> {
        let mode = self.base.device.detail_str("mode")?;
        if mode != "manual" {
            return Some(mode.to_string());
        }

        let mist_level = self.base.device.detail_i64("mist_virtual_level").unwrap_or(0);
        Some(
            if mist_level < 4 {
                MANUAL_LOW
            } else if mist_level < 7 {
                MANUAL_MID
            } else {
                MANUAL_HIGH
            }
            .to_string(),
        )
    }

    fn target_humidity(&self) -> u8 {
        self.base
            .device
            .detail_i64("auto_target_humidity")
            .unwrap_or(0)
            .clamp(0, 100) as u8
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        for key in HUMIDIFIER_ATTRIBUTES {
            if let Some(value) = self.base.device.details.get(*key) {
                attributes.insert((*key).to_string(), value.clone());
            }
        }
        attributes
    }
}

impl Entity for HumidifierEntity {
    fn entity_id(&self) -> String {
        entity_id(PLATFORM, &self.base.device, "")
    }

    fn name(&self) -> String {
        self.base.device.device_name.clone()
    }

    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn device(&self) -> &Device {
        &self.base.device
    }

    fn refresh(&mut self, device: Device) {
        self.base.refresh(device);
    }

    fn state(&self) -> EntityState {
        // device_status is always "on" for these models; enabled is the
        // real power state.
        EntityState::Humidifier(HumidifierState {
            on: self.base.device.enabled(),
            mode: self.mode(),
            target_humidity: self.target_humidity(),
            attributes: self.attributes(),
        })
    }

    fn as_toggleable(&self) -> Option<&dyn Toggleable> {
        Some(self)
    }

    fn as_mode(&self) -> Option<&dyn ModeAdjustable> {
        Some(self)
    }

    fn as_humidity(&self) -> Option<&dyn HumidityAdjustable> {
        Some(self)
    }
}

impl Toggleable for HumidifierEntity {
    fn turn_on(&self) -> Vec<VendorCall> {
        vec![VendorCall::TurnOn]
    }

    fn turn_off(&self) -> Vec<VendorCall> {
        vec![VendorCall::TurnOff]
    }
}

impl ModeAdjustable for HumidifierEntity {
    fn preset_modes(&self) -> Vec<String> {
        PRESET_MODES.iter().map(|mode| mode.to_string()).collect()
    }

    fn set_mode(&self, mode: &str) -> Result<Vec<VendorCall>, CommandError> {
        let mode = mode.to_lowercase();
        match mode.as_str() {
            MANUAL_LOW => Ok(vec![VendorCall::SetMistLevel(MIST_LOW)]),
            MANUAL_MID => Ok(vec![VendorCall::SetMistLevel(MIST_MID)]),
            MANUAL_HIGH => Ok(vec![VendorCall::SetMistLevel(MIST_HIGH)]),
            MODE_AUTO | MODE_SLEEP => Ok(vec![VendorCall::SetHumidityMode(mode)]),
            _ => Err(CommandError::InvalidPresetMode(mode)),
        }
    }
}

impl HumidityAdjustable for HumidifierEntity {
    fn set_humidity(&self, humidity: u8) -> Vec<VendorCall> {
        let mut calls = Vec::new();
        if !self.base.device.enabled() {
            calls.push(VendorCall::TurnOn);
        }
        calls.push(VendorCall::SetHumidityMode(MODE_AUTO.to_string()));
        calls.push(VendorCall::SetTargetHumidity(
            humidity.clamp(MIN_HUMIDITY, MAX_HUMIDITY),
        ));
        calls
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::vesync::testutil::device;
    use crate::vesync::testutil::with_detail;
    use crate::vesync::Category;

    fn humidifier(details: &[(&str, Value)]) -> Box<dyn Entity> {
        let mut humidifier = device("Classic300S", Category::Fan, "h1");
        for (key, value) in details {
            humidifier = with_detail(humidifier, key, value.clone());
        }
        HumidifierPlatform.create_entities(&[humidifier]).remove(0)
    }

    #[test]
    fn manual_mode_is_named_from_the_mist_level() {
        for (mist_level, expected) in [(1, MANUAL_LOW), (3, MANUAL_LOW), (4, MANUAL_MID), (6, MANUAL_MID), (7, MANUAL_HIGH), (9, MANUAL_HIGH)] {
            let entity = humidifier(&[
                ("mode", json!("manual")),
                ("mist_virtual_level", json!(mist_level)),
            ]);
            match entity.state() {
                EntityState::Humidifier(state) => {
                    assert_eq!(state.mode.as_deref(), Some(expected), "mist level {mist_level}")
                }
                other => panic!("expected humidifier state, got {:?}", other),
            }
        }
    }

    #[test]
    fn non_manual_modes_pass_through() {
        let entity = humidifier(&[("mode", json!("sleep")), ("enabled", json!(true))]);
        match entity.state() {
            EntityState::Humidifier(state) => {
                assert!(state.on);
                assert_eq!(state.mode.as_deref(), Some("sleep"));
            }
            other => panic!("expected humidifier state, got {:?}", other),
        }
    }

    #[test]
    fn manual_modes_translate_to_mist_levels() {
        let entity = humidifier(&[]);
        let mode = entity.as_mode().unwrap();
        assert_eq!(mode.set_mode("manual low").unwrap(), [VendorCall::SetMistLevel(3)]);
        assert_eq!(mode.set_mode("manual mid").unwrap(), [VendorCall::SetMistLevel(6)]);
        assert_eq!(mode.set_mode("Manual High").unwrap(), [VendorCall::SetMistLevel(9)]);
        assert_eq!(
            mode.set_mode("auto").unwrap(),
            [VendorCall::SetHumidityMode("auto".to_string())]
        );
        assert!(matches!(
            mode.set_mode("turbo"),
            Err(CommandError::InvalidPresetMode(_))
        ));
    }

    #[test]
    fn set_humidity_switches_to_auto_and_clamps() {
        let entity = humidifier(&[("enabled", json!(false))]);
        let humidity = entity.as_humidity().unwrap();
        assert_eq!(
            humidity.set_humidity(20),
            [
                VendorCall::TurnOn,
                VendorCall::SetHumidityMode("auto".to_string()),
                VendorCall::SetTargetHumidity(30)
            ]
        );

        let entity = humidifier(&[("enabled", json!(true))]);
        let humidity = entity.as_humidity().unwrap();
        assert_eq!(
            humidity.set_humidity(95),
            [
                VendorCall::SetHumidityMode("auto".to_string()),
                VendorCall::SetTargetHumidity(80)
            ]
        );
    }

    #[test]
    fn target_humidity_and_attributes_come_from_details() {
        let entity = humidifier(&[
            ("auto_target_humidity", json!(55)),
            ("humidity", json!(48)),
            ("water_lacks", json!(false)),
        ]);
        match entity.state() {
            EntityState::Humidifier(state) => {
                assert_eq!(state.target_humidity, 55);
                assert_eq!(state.attributes["humidity"], json!(48));
                assert_eq!(state.attributes["water_lacks"], json!(false));
            }
            other => panic!("expected humidifier state, got {:?}", other),
        }
    }
}
