use strum::Display;
use strum::EnumIter;

use crate::vesync::Category;
use crate::vesync::Device;

/// Capability category used to route a device to its presentation platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CapabilityBucket {
    Switches,
    Fans,
    Lights,
    Humidifiers,
}

/// Vendor models in the fan category that are really humidifiers, and the
/// buckets each one contributes entities to. A model with an entry here
/// fans out to every listed bucket instead of the Fans bucket.
///
/// This is the single source of truth for multi-bucket classification:
/// adding a model is a data change, and the platform tables must recognize
/// every (model, bucket) pair listed (guarded by a test in `platforms`).
pub type HumidifierBucketTable = &'static [(&'static str, &'static [CapabilityBucket])];

pub const HUMIDIFIER_BUCKETS: HumidifierBucketTable = &[
    (
        "Classic300S",
        &[
            CapabilityBucket::Humidifiers,
            CapabilityBucket::Switches,
            CapabilityBucket::Lights,
        ],
    ),
    (
        "Dual200S",
        &[CapabilityBucket::Humidifiers, CapabilityBucket::Switches],
    ),
    (
        "Dual301S",
        &[CapabilityBucket::Humidifiers, CapabilityBucket::Switches],
    ),
    (
        "LUH-D301S-WEU",
        &[CapabilityBucket::Humidifiers, CapabilityBucket::Switches],
    ),
];

/// Per-bucket device lists produced by one classification pass.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub switches: Vec<Device>,
    pub fans: Vec<Device>,
    pub lights: Vec<Device>,
    pub humidifiers: Vec<Device>,
}

impl Classified {
    pub fn bucket(&self, bucket: CapabilityBucket) -> &[Device] {
        match bucket {
            CapabilityBucket::Switches => &self.switches,
            CapabilityBucket::Fans => &self.fans,
            CapabilityBucket::Lights => &self.lights,
            CapabilityBucket::Humidifiers => &self.humidifiers,
        }
    }

    fn bucket_mut(&mut self, bucket: CapabilityBucket) -> &mut Vec<Device> {
        match bucket {
            CapabilityBucket::Switches => &mut self.switches,
            CapabilityBucket::Fans => &mut self.fans,
            CapabilityBucket::Lights => &mut self.lights,
            CapabilityBucket::Humidifiers => &mut self.humidifiers,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "switches={} fans={} lights={} humidifiers={}",
            self.switches.len(),
            self.fans.len(),
            self.lights.len(),
            self.humidifiers.len()
        )
    }
}

/// Partition a vendor snapshot into capability buckets.
///
/// Never fails and never drops a device: an unrecognized model lands in its
/// category-default bucket, and the platform layer decides later whether it
/// can present it. Multi-bucket membership comes only from `table`.
pub fn classify(devices: &[Device], table: HumidifierBucketTable) -> Classified {
    let mut classified = Classified::default();

    for device in devices {
        match device.category {
            Category::Fan => {
                let entry = table
                    .iter()
                    .find(|(model, _)| *model == device.device_type);
                if let Some((_, buckets)) = entry {
                    for bucket in *buckets {
                        classified.bucket_mut(*bucket).push(device.clone());
                    }
                } else {
                    classified.fans.push(device.clone());
                }
            }
            Category::Bulb => classified.lights.push(device.clone()),
            Category::Outlet => classified.switches.push(device.clone()),
            Category::Switch => {
                // A dimmable wall switch is presented as a light.
                if device.dimmable {
                    classified.lights.push(device.clone());
                } else {
                    classified.switches.push(device.clone());
                }
            }
        }
    }

    classified
}
