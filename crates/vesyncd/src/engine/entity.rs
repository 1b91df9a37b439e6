use super::message::CommandError;
use super::state::EntityState;
use crate::vesync::Device;
use crate::vesync::VendorCall;

/// Build the id an entity is addressed by: platform-qualified, derived from
/// the device id plus an optional suffix for secondary entities (display
/// switches, night lights, sensors).
pub fn entity_id(platform: &str, device: &Device, suffix: &str) -> String {
    format!("{}.{}{}", platform, device.unique_id(), suffix)
}

/// One presentable entity backed by a vendor device.
///
/// Entities are created by a platform when its bucket announces devices, and
/// refreshed with the matching device from each subsequent snapshot. Command
/// capabilities are opt-in via the `as_*` accessors; the engine routes a
/// command to the corresponding trait or rejects it as unsupported.
pub trait Entity: Send + Sync {
    fn entity_id(&self) -> String;

    fn name(&self) -> String;

    /// Platform that created this entity (also the entity id prefix).
    fn platform(&self) -> &'static str;

    fn device(&self) -> &Device;

    fn available(&self) -> bool {
        self.device().is_online()
    }

    /// Replace the backing device with a fresh snapshot of it.
    fn refresh(&mut self, device: Device);

    fn state(&self) -> EntityState;

    fn as_toggleable(&self) -> Option<&dyn Toggleable> {
        None
    }

    fn as_brightness(&self) -> Option<&dyn BrightnessAdjustable> {
        None
    }

    fn as_color_temp(&self) -> Option<&dyn ColorTempAdjustable> {
        None
    }

    fn as_speed(&self) -> Option<&dyn SpeedAdjustable> {
        None
    }

    fn as_mode(&self) -> Option<&dyn ModeAdjustable> {
        None
    }

    fn as_humidity(&self) -> Option<&dyn HumidityAdjustable> {
        None
    }
}

/// Entities that can be switched on and off.
pub trait Toggleable {
    fn turn_on(&self) -> Vec<VendorCall>;
    fn turn_off(&self) -> Vec<VendorCall>;
}

/// Entities accepting a brightness level (0-255).
pub trait BrightnessAdjustable {
    fn set_brightness(&self, brightness: u8) -> Vec<VendorCall>;
}

/// Entities accepting a color temperature in Mireds.
pub trait ColorTempAdjustable {
    fn set_color_temp(&self, mireds: u16) -> Vec<VendorCall>;
}

/// Entities accepting a speed percentage. Zero percent means off.
pub trait SpeedAdjustable {
    fn set_percentage(&self, percentage: u8) -> Vec<VendorCall>;
}

/// Entities with a set of named preset modes.
pub trait ModeAdjustable {
    fn preset_modes(&self) -> Vec<String>;
    fn set_mode(&self, mode: &str) -> Result<Vec<VendorCall>, CommandError>;
}

/// Entities accepting a target humidity percentage.
pub trait HumidityAdjustable {
    fn set_humidity(&self, humidity: u8) -> Vec<VendorCall>;
}

/// Common storage for entity implementations: the backing device snapshot.
#[derive(Debug, Clone)]
pub struct EntityBase {
    pub device: Device,
}

impl EntityBase {
    pub fn new(device: Device) -> Self {
        EntityBase { device }
    }

    pub fn refresh(&mut self, device: Device) {
        self.device = device;
    }
}
