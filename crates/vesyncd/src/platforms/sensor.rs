use linkme::distributed_slice;
use tracing::warn;

use super::Platform;
use super::PLATFORM_REGISTRY;
use crate::engine::entity_id;
use crate::engine::state::BinarySensorState;
use crate::engine::state::EntityState;
use crate::engine::state::SensorState;
use crate::engine::CapabilityBucket;
use crate::engine::Entity;
use crate::engine::EntityBase;
use crate::vesync::Device;

/// Read-only sensors exposed alongside each humidifier.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SensorKind {
    Humidity,
    HighHumidity,
    WaterLack,
    WaterTank,
}

const SENSOR_KINDS: &[SensorKind] = &[
    SensorKind::Humidity,
    SensorKind::HighHumidity,
    SensorKind::WaterLack,
    SensorKind::WaterTank,
];

const SENSOR_MODELS: &[&str] = &["Classic300S", "Dual200S", "Dual301S", "LUH-D301S-WEU"];

impl SensorKind {
    fn platform(self) -> &'static str {
        match self {
            SensorKind::Humidity => "sensor",
            _ => "binary_sensor",
        }
    }

    fn id_suffix(self) -> &'static str {
        match self {
            SensorKind::Humidity => "_humidity_sensor",
            SensorKind::HighHumidity => "_high_humidity_sensor",
            SensorKind::WaterLack => "_water_lack_sensor",
            SensorKind::WaterTank => "_water_tank_sensor",
        }
    }

    fn name_suffix(self) -> &'static str {
        match self {
            SensorKind::Humidity => "humidity sensor",
            SensorKind::HighHumidity => "high humidity",
            SensorKind::WaterLack => "water lack",
            SensorKind::WaterTank => "water tank",
        }
    }

    fn detail_key(self) -> &'static str {
        match self {
            SensorKind::Humidity => "humidity",
            SensorKind::HighHumidity => "humidity_high",
            SensorKind::WaterLack => "water_lacks",
            SensorKind::WaterTank => "water_tank_lifted",
        }
    }
}

pub struct SensorPlatform;

#[distributed_slice(PLATFORM_REGISTRY)]
fn new_sensor_platform() -> Box<dyn Platform> {
    Box::new(SensorPlatform)
}

impl Platform for SensorPlatform {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn bucket(&self) -> CapabilityBucket {
        CapabilityBucket::Humidifiers
    }

    fn recognizes(&self, device_type: &str) -> bool {
        SENSOR_MODELS.contains(&device_type)
    }

    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>> {
        let mut entities: Vec<Box<dyn Entity>> = Vec::new();
        for device in devices {
            if !self.recognizes(&device.device_type) {
                warn!(
                    device_name = %device.device_name,
                    device_type = %device.device_type,
                    "unknown device type"
                );
                continue;
            }

            for kind in SENSOR_KINDS {
                entities.push(Box::new(SensorEntity {
                    base: EntityBase::new(device.clone()),
                    kind: *kind,
                }));
            }
        }
        entities
    }
}

struct SensorEntity {
    base: EntityBase,
    kind: SensorKind,
}

impl Entity for SensorEntity {
    fn entity_id(&self) -> String {
        entity_id(self.kind.platform(), &self.base.device, self.kind.id_suffix())
    }

    fn name(&self) -> String {
        format!(
            "{} ({})",
            self.base.device.device_name,
            self.kind.name_suffix()
        )
    }

    fn platform(&self) -> &'static str {
        self.kind.platform()
    }

    fn device(&self) -> &Device {
        &self.base.device
    }

    fn refresh(&mut self, device: Device) {
        self.base.refresh(device);
    }

    fn state(&self) -> EntityState {
        // A missing or malformed detail reads as zero/false rather than
        // failing the refresh.
        match self.kind {
            SensorKind::Humidity => EntityState::Sensor(SensorState {
                value: self.base.device.detail_i64(self.kind.detail_key()).unwrap_or(0),
            }),
            _ => EntityState::BinarySensor(BinarySensorState {
                on: self
                    .base
                    .device
                    .detail_bool(self.kind.detail_key())
                    .unwrap_or(false),
            }),
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
    fn each_humidifier_gets_four_sensors() {
        let mut humidifier = device("Classic300S", Category::Fan, "h1");
        humidifier = with_detail(humidifier, "humidity", json!(47));
        humidifier = with_detail(humidifier, "water_lacks", json!(true));
        let entities = SensorPlatform.create_entities(&[humidifier]);

        let ids: Vec<String> = entities.iter().map(|entity| entity.entity_id()).collect();
        assert_eq!(
            ids,
            [
                "sensor.h1_humidity_sensor",
                "binary_sensor.h1_high_humidity_sensor",
                "binary_sensor.h1_water_lack_sensor",
                "binary_sensor.h1_water_tank_sensor",
            ]
        );

        assert_eq!(
            entities[0].state(),
            EntityState::Sensor(SensorState { value: 47 })
        );
        assert_eq!(
            entities[2].state(),
            EntityState::BinarySensor(BinarySensorState { on: true })
        );
        // Absent details default to inactive.
        assert_eq!(
            entities[3].state(),
            EntityState::BinarySensor(BinarySensorState { on: false })
        );
    }

    #[test]
    fn sensor_names_carry_their_kind() {
        let entities =
            SensorPlatform.create_entities(&[device("Dual200S", Category::Fan, "h1")]);
        let names: Vec<String> = entities.iter().map(|entity| entity.name()).collect();
        assert!(names[0].ends_with("(humidity sensor)"));
        assert!(names[1].ends_with("(high humidity)"));
    }

    #[test]
    fn unknown_model_produces_no_sensors() {
        let entities =
            SensorPlatform.create_entities(&[device("Core200S", Category::Fan, "f1")]);
        assert!(entities.is_empty());
    }
}
