use linkme::distributed_slice;
use tracing::debug;

use super::Platform;
use super::PLATFORM_REGISTRY;
use crate::engine::entity_id;
use crate::engine::state::EntityState;
use crate::engine::state::LightState;
use crate::engine::BrightnessAdjustable;
use crate::engine::CapabilityBucket;
use crate::engine::ColorTempAdjustable;
use crate::engine::Entity;
use crate::engine::EntityBase;
use crate::engine::Toggleable;
use crate::units;
use crate::vesync::Device;
use crate::vesync::VendorCall;

const PLATFORM: &str = "light";

#[derive(Debug, Clone, Copy, PartialEq)]
enum LightKind {
    WallDimmer,
    DimmableBulb,
    /// Bulb with adjustable white temperature.
    TunableBulb,
    /// Secondary entity for a humidifier's night light.
    NightLight,
}

const LIGHT_KINDS: &[(&str, LightKind)] = &[
    ("ESD16", LightKind::WallDimmer),
    ("ESWD16", LightKind::WallDimmer),
    ("ESL100", LightKind::DimmableBulb),
    ("ESL100CW", LightKind::TunableBulb),
    ("Classic300S", LightKind::NightLight),
];

fn kind_of(device_type: &str) -> Option<LightKind> {
    LIGHT_KINDS
        .iter()
        .find(|(model, _)| *model == device_type)
        .map(|(_, kind)| *kind)
}

pub struct LightPlatform;

#[distributed_slice(PLATFORM_REGISTRY)]
fn new_light_platform() -> Box<dyn Platform> {
    Box::new(LightPlatform)
}

impl Platform for LightPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn bucket(&self) -> CapabilityBucket {
        CapabilityBucket::Lights
    }

    fn recognizes(&self, device_type: &str) -> bool {
        kind_of(device_type).is_some()
    }

    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        for device in devices {
            match kind_of(&device.device_type) {
                Some(kind) => entities.push(Box::new(LightEntity {
                    base: EntityBase::new(device.clone()),
                    kind,
                })),
                None => debug!(
                    device_name = %device.device_name,
                    device_type = %device.device_type,
                    "unknown device type"
                ),
            }
        }
        entities
    }
}

struct LightEntity {
    base: EntityBase,
    kind: LightKind,
}

impl LightEntity {
    fn brightness_detail_key(&self) -> &'static str {
        match self.kind {
            LightKind::NightLight => "night_light_brightness",
            _ => "brightness",
        }
    }

    /// Vendor brightness percentage mapped to the 0-255 scale. A missing or
    /// malformed detail reads as zero rather than failing the refresh.
    fn brightness(&self) -> u8 {
        match self.base.device.detail_i64(self.brightness_detail_key()) {
            Some(pct) => units::brightness_pct_to_ha(pct.clamp(0, 100) as u8),
            None => 0,
        }
    }

    fn color_temp(&self) -> u16 {
        match self.base.device.detail_i64("color_temp_pct") {
            Some(pct) => units::color_temp_pct_to_mireds(
                pct.clamp(0, 100) as u8,
                units::MIN_MIREDS,
                units::MAX_MIREDS,
            ),
            None => 0,
        }
    }

    fn is_on(&self) -> bool {
        match self.kind {
            LightKind::NightLight => {
                self.base.device.enabled()
                    && self
                        .base
                        .device
                        .detail_i64("night_light_brightness")
                        .unwrap_or(0)
                        > 0
            }
            _ => self.base.device.is_on(),
        }
    }
}

impl Entity for LightEntity {
    fn entity_id(&self) -> String {
        let suffix = match self.kind {
            LightKind::NightLight => "_night_light",
            _ => "",
        };
        entity_id(PLATFORM, &self.base.device, suffix)
    }

    fn name(&self) -> String {
        match self.kind {
            LightKind::NightLight => {
                format!("{} (night light)", self.base.device.device_name)
            }
            _ => self.base.device.device_name.clone(),
        }
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
        EntityState::Light(LightState {
            on: self.is_on(),
            brightness: Some(self.brightness()),
            color_temp: match self.kind {
                LightKind::TunableBulb => Some(self.color_temp()),
                _ => None,
            },
        })
    }

    fn as_toggleable(&self) -> Option<&dyn Toggleable> {
        Some(self)
    }

    fn as_brightness(&self) -> Option<&dyn BrightnessAdjustable> {
        Some(self)
    }

    fn as_color_temp(&self) -> Option<&dyn ColorTempAdjustable> {
        match self.kind {
            LightKind::TunableBulb => Some(self),
            _ => None,
        }
    }
}

impl Toggleable for LightEntity {
    fn turn_on(&self) -> Vec<VendorCall> {
        match self.kind {
            LightKind::NightLight => vec![VendorCall::SetNightLightBrightness(100)],
            _ => vec![VendorCall::TurnOn],
        }
    }

    fn turn_off(&self) -> Vec<VendorCall> {
        match self.kind {
            LightKind::NightLight => vec![VendorCall::SetNightLightBrightness(0)],
            _ => vec![VendorCall::TurnOff],
        }
    }
}

impl BrightnessAdjustable for LightEntity {
    fn set_brightness(&self, brightness: u8) -> Vec<VendorCall> {
        let pct = units::brightness_ha_to_pct(brightness);
        match self.kind {
            LightKind::NightLight => vec![VendorCall::SetNightLightBrightness(pct)],
            _ => vec![VendorCall::SetBrightness(pct)],
        }
    }
}

impl ColorTempAdjustable for LightEntity {
    fn set_color_temp(&self, mireds: u16) -> Vec<VendorCall> {
        let pct = units::color_temp_mireds_to_pct(mireds, units::MIN_MIREDS, units::MAX_MIREDS);
        vec![VendorCall::SetColorTemp(pct)]
    }
}
