use std::collections::HashSet;

use strum::IntoEnumIterator;

use super::CapabilityBucket;
use super::Classified;
use crate::vesync::Device;

/// Devices that newly appeared in one bucket during one poll cycle.
///
/// Exactly one of these is produced per bucket per cycle when the bucket
/// gained devices - never both. `BucketDiscovered` marks the empty to
/// non-empty transition, where the bucket's platform performs its one-shot
/// setup; `DevicesAdded` announces increments to an already-active bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    BucketDiscovered {
        bucket: CapabilityBucket,
        devices: Vec<Device>,
    },
    DevicesAdded {
        bucket: CapabilityBucket,
        devices: Vec<Device>,
    },
}

impl DiscoveryEvent {
    pub fn bucket(&self) -> CapabilityBucket {
        match self {
            DiscoveryEvent::BucketDiscovered { bucket, .. }
            | DiscoveryEvent::DevicesAdded { bucket, .. } => *bucket,
        }
    }

    pub fn devices(&self) -> &[Device] {
        match self {
            DiscoveryEvent::BucketDiscovered { devices, .. }
            | DiscoveryEvent::DevicesAdded { devices, .. } => devices,
        }
    }
}

/// Known devices per bucket, owned by the polling component.
///
/// Only the discovery step mutates it: new devices are appended before any
/// event is emitted, so listeners always observe the updated lists. Devices
/// that vanish from a vendor snapshot are deliberately not pruned; a restart
/// performs the full resync.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    pub switches: Vec<Device>,
    pub fans: Vec<Device>,
    pub lights: Vec<Device>,
    pub humidifiers: Vec<Device>,
}

impl DeviceRegistry {
    fn bucket_mut(&mut self, bucket: CapabilityBucket) -> &mut Vec<Device> {
        match bucket {
            CapabilityBucket::Switches => &mut self.switches,
            CapabilityBucket::Fans => &mut self.fans,
            CapabilityBucket::Lights => &mut self.lights,
            CapabilityBucket::Humidifiers => &mut self.humidifiers,
        }
    }

    /// Fold a fresh classification into the registry, returning at most one
    /// event per bucket describing the newly seen devices.
    pub fn apply(&mut self, classified: &Classified) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();

        for bucket in CapabilityBucket::iter() {
            let known = self.bucket_mut(bucket);
            let seen: HashSet<String> = known.iter().map(Device::unique_id).collect();
            let new: Vec<Device> = classified
                .bucket(bucket)
                .iter()
                .filter(|device| !seen.contains(&device.unique_id()))
                .cloned()
                .collect();
            if new.is_empty() {
                continue;
            }

            let first_devices = known.is_empty();
            known.extend(new.iter().cloned());
            events.push(if first_devices {
                DiscoveryEvent::BucketDiscovered {
                    bucket,
                    devices: new,
                }
            } else {
                DiscoveryEvent::DevicesAdded {
                    bucket,
                    devices: new,
                }
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::classify;
    use crate::engine::classify::HUMIDIFIER_BUCKETS;
    use crate::vesync::testutil::device;
    use crate::vesync::Category;

    #[test]
    fn first_devices_trigger_the_bucket_setup_path() {
        let mut registry = DeviceRegistry::default();
        let classified = classify(
            &[
                device("Core200S", Category::Fan, "f1"),
                device("Core300S", Category::Fan, "f2"),
            ],
            HUMIDIFIER_BUCKETS,
        );

        let events = registry.apply(&classified);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DiscoveryEvent::BucketDiscovered { bucket, devices } => {
                assert_eq!(*bucket, CapabilityBucket::Fans);
                assert_eq!(devices.len(), 2);
            }
            other => panic!("expected BucketDiscovered, got {:?}", other),
        }
        assert_eq!(registry.fans.len(), 2);
    }

    #[test]
    fn later_devices_trigger_the_incremental_path() {
        let mut registry = DeviceRegistry::default();
        registry.apply(&classify(
            &[
                device("Core200S", Category::Fan, "f1"),
                device("Core300S", Category::Fan, "f2"),
            ],
            HUMIDIFIER_BUCKETS,
        ));

        let events = registry.apply(&classify(
            &[
                device("Core200S", Category::Fan, "f1"),
                device("Core300S", Category::Fan, "f2"),
                device("Core400S", Category::Fan, "f3"),
            ],
            HUMIDIFIER_BUCKETS,
        ));

        assert_eq!(events.len(), 1);
        match &events[0] {
            DiscoveryEvent::DevicesAdded { bucket, devices } => {
                assert_eq!(*bucket, CapabilityBucket::Fans);
                assert_eq!(devices[0].unique_id(), "f3");
                assert_eq!(devices.len(), 1);
            }
            other => panic!("expected DevicesAdded, got {:?}", other),
        }
        assert_eq!(registry.fans.len(), 3);
    }

    #[test]
    fn unchanged_snapshot_produces_no_events() {
        let mut registry = DeviceRegistry::default();
        let classified = classify(
            &[device("ESW15-USA", Category::Outlet, "o1")],
            HUMIDIFIER_BUCKETS,
        );
        registry.apply(&classified);
        assert!(registry.apply(&classified).is_empty());
    }

    #[test]
    fn vanished_devices_are_not_pruned() {
        let mut registry = DeviceRegistry::default();
        registry.apply(&classify(
            &[
                device("ESW15-USA", Category::Outlet, "o1"),
                device("ESW15-USA", Category::Outlet, "o2"),
            ],
            HUMIDIFIER_BUCKETS,
        ));

        let events = registry.apply(&classify(
            &[device("ESW15-USA", Category::Outlet, "o1")],
            HUMIDIFIER_BUCKETS,
        ));
        assert!(events.is_empty());
        assert_eq!(registry.switches.len(), 2);
    }

    #[test]
    fn multi_bucket_device_announces_in_each_bucket() {
        let mut registry = DeviceRegistry::default();
        let events = registry.apply(&classify(
            &[device("Classic300S", Category::Fan, "h1")],
            HUMIDIFIER_BUCKETS,
        ));

        let buckets: Vec<CapabilityBucket> = events.iter().map(DiscoveryEvent::bucket).collect();
        assert!(buckets.contains(&CapabilityBucket::Humidifiers));
        assert!(buckets.contains(&CapabilityBucket::Switches));
        assert!(buckets.contains(&CapabilityBucket::Lights));
        assert!(!buckets.contains(&CapabilityBucket::Fans));
    }
}
