use linkme::distributed_slice;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use super::Platform;
use super::PLATFORM_REGISTRY;
use crate::engine::entity_id;
use crate::engine::state::EntityState;
use crate::engine::state::FanState;
use crate::engine::CapabilityBucket;
use crate::engine::CommandError;
use crate::engine::Entity;
use crate::engine::EntityBase;
use crate::engine::ModeAdjustable;
use crate::engine::SpeedAdjustable;
use crate::engine::Toggleable;
use crate::units;
use crate::units::SPEED_RANGE;
use crate::vesync::Device;
use crate::vesync::VendorCall;

const PLATFORM: &str = "fan";

const MODE_AUTO: &str = "auto";
const MODE_SLEEP: &str = "sleep";
const MODE_MANUAL: &str = "manual";

/// Air purifier models and the preset modes each supports.
const FAN_MODELS: &[(&str, &[&str])] = &[
    ("LV-PUR131S", &[MODE_AUTO, MODE_SLEEP]),
    ("Core200S", &[MODE_SLEEP]),
    ("Core300S", &[MODE_AUTO, MODE_SLEEP]),
    ("Core400S", &[MODE_AUTO, MODE_SLEEP]),
];

/// Detail keys surfaced as state attributes when present.
const FAN_ATTRIBUTES: &[&str] = &[
    "active_time",
    "screen_status",
    "child_lock",
    "night_light",
    "display_state",
    "air_quality",
    "mode",
    "filter_life",
];

fn preset_modes_of(device_type: &str) -> Option<&'static [&'static str]> {
    FAN_MODELS
        .iter()
        .find(|(model, _)| *model == device_type)
        .map(|(_, modes)| *modes)
}

pub struct FanPlatform;

#[distributed_slice(PLATFORM_REGISTRY)]
fn new_fan_platform() -> Box<dyn Platform> {
    Box::new(FanPlatform)
}

impl Platform for FanPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn bucket(&self) -> CapabilityBucket {
        CapabilityBucket::Fans
    }

    fn recognizes(&self, device_type: &str) -> bool {
        preset_modes_of(device_type).is_some()
    }

    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        for device in devices {
            match preset_modes_of(&device.device_type) {
                Some(preset_modes) => entities.push(Box::new(FanEntity {
                    base: EntityBase::new(device.clone()),
                    preset_modes,
                })),
                None => warn!(
                    device_name = %device.device_name,
                    device_type = %device.device_type,
                    "unknown device type"
                ),
            }
        }
        entities
    }
}

struct FanEntity {
    base: EntityBase,
    preset_modes: &'static [&'static str],
}

impl FanEntity {
    fn mode(&self) -> Option<String> {
        self.base.device.detail_str("mode").map(str::to_string)
    }

    /// Speed as a percentage. Only meaningful in manual mode; preset modes
    /// drive the fan themselves.
    fn percentage(&self) -> Option<u8> {
        if self.mode().as_deref() != Some(MODE_MANUAL) {
            return None;
        }
        self.base
            .device
            .detail_i64("fan_level")
            .map(|level| units::ranged_value_to_percentage(SPEED_RANGE, level.clamp(0, u8::MAX as i64) as u8))
    }

    fn preset_mode(&self) -> Option<String> {
        self.mode().filter(|mode| self.preset_modes.contains(&mode.as_str()))
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        for key in FAN_ATTRIBUTES {
            if let Some(value) = self.base.device.details.get(*key) {
                attributes.insert((*key).to_string(), value.clone());
            }
        }
        attributes
    }
}

impl Entity for FanEntity {
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
        EntityState::Fan(FanState {
            on: self.base.device.is_on(),
            percentage: self.percentage(),
            preset_mode: self.preset_mode(),
            attributes: self.attributes(),
        })
    }

    fn as_toggleable(&self) -> Option<&dyn Toggleable> {
        Some(self)
    }

    fn as_speed(&self) -> Option<&dyn SpeedAdjustable> {
        Some(self)
    }

    fn as_mode(&self) -> Option<&dyn ModeAdjustable> {
        Some(self)
    }
}

impl Toggleable for FanEntity {
    fn turn_on(&self) -> Vec<VendorCall> {
        vec![VendorCall::TurnOn]
    }

    fn turn_off(&self) -> Vec<VendorCall> {
        vec![VendorCall::TurnOff]
    }
}

impl SpeedAdjustable for FanEntity {
    fn set_percentage(&self, percentage: u8) -> Vec<VendorCall> {
        if percentage == 0 {
            return vec![VendorCall::TurnOff];
        }

        let mut calls = Vec::new();
        if !self.base.device.is_on() {
            calls.push(VendorCall::TurnOn);
        }
        calls.push(VendorCall::ManualMode);
        calls.push(VendorCall::SetFanSpeed(units::percentage_to_ranged_value(
            SPEED_RANGE,
            percentage,
        )));
        calls
    }
}

impl ModeAdjustable for FanEntity {
    fn preset_modes(&self) -> Vec<String> {
        self.preset_modes.iter().map(|mode| mode.to_string()).collect()
    }

    fn set_mode(&self, mode: &str) -> Result<Vec<VendorCall>, CommandError> {
        if !self.preset_modes.contains(&mode) {
            return Err(CommandError::InvalidPresetMode(mode.to_string()));
        }

        let mut calls = Vec::new();
        if !self.base.device.is_on() {
            calls.push(VendorCall::TurnOn);
        }
        calls.push(match mode {
            MODE_AUTO => VendorCall::AutoMode,
            _ => VendorCall::SleepMode,
        });
        Ok(calls)
    }
}
