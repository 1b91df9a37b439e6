use linkme::distributed_slice;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use super::Platform;
use super::PLATFORM_REGISTRY;
use crate::engine::entity_id;
use crate::engine::state::EntityState;
use crate::engine::state::SwitchState;
use crate::engine::CapabilityBucket;
use crate::engine::Entity;
use crate::engine::EntityBase;
use crate::engine::Toggleable;
use crate::vesync::Device;
use crate::vesync::VendorCall;

const PLATFORM: &str = "switch";

#[derive(Debug, Clone, Copy, PartialEq)]
enum SwitchKind {
    /// Smart plug, possibly with energy metering.
    Outlet,
    /// In-wall light switch.
    Wall,
    /// Secondary entity controlling a humidifier's display panel.
    HumidifierDisplay,
}

const SWITCH_KINDS: &[(&str, SwitchKind)] = &[
    ("wifi-switch-1.3", SwitchKind::Outlet),
    ("ESW03-USA", SwitchKind::Outlet),
    ("ESW01-EU", SwitchKind::Outlet),
    ("ESW15-USA", SwitchKind::Outlet),
    ("ESO15-TB", SwitchKind::Outlet),
    ("ESWL01", SwitchKind::Wall),
    ("ESWL03", SwitchKind::Wall),
    ("Classic300S", SwitchKind::HumidifierDisplay),
    ("Dual200S", SwitchKind::HumidifierDisplay),
    ("Dual301S", SwitchKind::HumidifierDisplay),
    ("LUH-D301S-WEU", SwitchKind::HumidifierDisplay),
];

/// Outlet detail keys surfaced as state attributes when present.
const OUTLET_ATTRIBUTES: &[&str] = &[
    "voltage",
    "power",
    "energy",
    "weekly_energy_total",
    "monthly_energy_total",
    "yearly_energy_total",
];

fn kind_of(device_type: &str) -> Option<SwitchKind> {
    SWITCH_KINDS
        .iter()
        .find(|(model, _)| *model == device_type)
        .map(|(_, kind)| *kind)
}

pub struct SwitchPlatform;

#[distributed_slice(PLATFORM_REGISTRY)]
fn new_switch_platform() -> Box<dyn Platform> {
    Box::new(SwitchPlatform)
}

impl Platform for SwitchPlatform {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    fn bucket(&self) -> CapabilityBucket {
        CapabilityBucket::Switches
    }

    fn recognizes(&self, device_type: &str) -> bool {
        kind_of(device_type).is_some()
    }

    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        for device in devices {
            match kind_of(&device.device_type) {
                Some(kind) => entities.push(Box::new(SwitchEntity {
                    base: EntityBase::new(device.clone()),
                    kind,
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

struct SwitchEntity {
    base: EntityBase,
    kind: SwitchKind,
}

impl SwitchEntity {
    fn is_on(&self) -> bool {
        match self.kind {
            SwitchKind::Outlet | SwitchKind::Wall => self.base.device.is_on(),
            SwitchKind::HumidifierDisplay => {
                self.base.device.enabled()
                    && self.base.device.detail_bool("display").unwrap_or(false)
            }
        }
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        if self.kind == SwitchKind::Outlet {
            for key in OUTLET_ATTRIBUTES {
                if let Some(value) = self.base.device.details.get(*key) {
                    attributes.insert((*key).to_string(), value.clone());
                }
            }
        }
        attributes
    }
}

impl Entity for SwitchEntity {
    fn entity_id(&self) -> String {
        let suffix = match self.kind {
            SwitchKind::HumidifierDisplay => "_display",
            _ => "",
        };
        entity_id(PLATFORM, &self.base.device, suffix)
    }

    fn name(&self) -> String {
        match self.kind {
            SwitchKind::HumidifierDisplay => {
                format!("{} (display)", self.base.device.device_name)
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
        EntityState::Switch(SwitchState {
            on: self.is_on(),
            attributes: self.attributes(),
        })
    }

    fn as_toggleable(&self) -> Option<&dyn Toggleable> {
        Some(self)
    }
}

impl Toggleable for SwitchEntity {
    fn turn_on(&self) -> Vec<VendorCall> {
        match self.kind {
            SwitchKind::HumidifierDisplay => vec![VendorCall::SetDisplay(true)],
            _ => vec![VendorCall::TurnOn],
        }
    }

    fn turn_off(&self) -> Vec<VendorCall> {
        match self.kind {
            SwitchKind::HumidifierDisplay => vec![VendorCall::SetDisplay(false)],
            _ => vec![VendorCall::TurnOff],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::vesync::testutil::device;
    use crate::vesync::testutil::with_detail;
    use crate::vesync::Category;

    #[test]
    fn outlet_state_carries_energy_attributes() {
        let mut outlet = device("ESW15-USA", Category::Outlet, "o1");
        outlet = with_detail(outlet, "voltage", json!(229.5));
        outlet = with_detail(outlet, "power", json!(12.4));
        let entities = SwitchPlatform.create_entities(&[outlet]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_id(), "switch.o1");

        match entities[0].state() {
            EntityState::Switch(state) => {
                assert!(state.on);
                assert_eq!(state.attributes["voltage"], json!(229.5));
                assert_eq!(state.attributes["power"], json!(12.4));
            }
            other => panic!("expected switch state, got {:?}", other),
        }
    }

    #[test]
    fn wall_switch_has_no_attributes() {
        let entities = SwitchPlatform.create_entities(&[device("ESWL01", Category::Switch, "w1")]);
        match entities[0].state() {
            EntityState::Switch(state) => assert!(state.attributes.is_empty()),
            other => panic!("expected switch state, got {:?}", other),
        }
    }

    #[test]
    fn display_switch_is_a_secondary_entity() {
        let mut humidifier = device("Classic300S", Category::Fan, "h1");
        humidifier = with_detail(humidifier, "enabled", json!(true));
        humidifier = with_detail(humidifier, "display", json!(true));
        let entities = SwitchPlatform.create_entities(&[humidifier.clone()]);

        let display = &entities[0];
        assert_eq!(display.entity_id(), "switch.h1_display");
        assert_eq!(display.name(), format!("{} (display)", humidifier.device_name));
        match display.state() {
            EntityState::Switch(state) => assert!(state.on),
            other => panic!("expected switch state, got {:?}", other),
        }

        let toggle = display.as_toggleable().unwrap();
        assert_eq!(toggle.turn_on(), [VendorCall::SetDisplay(true)]);
        assert_eq!(toggle.turn_off(), [VendorCall::SetDisplay(false)]);
    }

    #[test]
    fn display_switch_is_off_when_device_disabled() {
        let mut humidifier = device("Classic300S", Category::Fan, "h1");
        humidifier = with_detail(humidifier, "enabled", json!(false));
        humidifier = with_detail(humidifier, "display", json!(true));
        let entities = SwitchPlatform.create_entities(&[humidifier]);
        match entities[0].state() {
            EntityState::Switch(state) => assert!(!state.on),
            other => panic!("expected switch state, got {:?}", other),
        }
    }

    #[test]
    fn unknown_model_is_skipped() {
        let entities = SwitchPlatform.create_entities(&[
            device("ESW99-FUTURE", Category::Outlet, "o1"),
            device("ESW15-USA", Category::Outlet, "o2"),
        ]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_id(), "switch.o2");
    }
}
