mod fan;
mod humidifier;
mod light;
mod sensor;
mod switch;

use linkme::distributed_slice;

use crate::engine::CapabilityBucket;
use crate::engine::Entity;
use crate::vesync::Device;

/// A presentation platform: builds entities for the devices of one bucket.
///
/// Platforms are registered at link time; the engine instantiates all of
/// them and routes each discovery event to every platform serving the
/// event's bucket.
pub trait Platform: Send + Sync {
    fn name(&self) -> &'static str;

    fn bucket(&self) -> CapabilityBucket;

    /// Whether this platform has a presentation for the given model.
    fn recognizes(&self, device_type: &str) -> bool;

    /// Build entities for newly discovered devices. Unrecognized models are
    /// logged and skipped; the rest of the batch is unaffected.
    fn create_entities(&self, devices: &[Device]) -> Vec<Box<dyn Entity>>;
}

#[distributed_slice]
pub static PLATFORM_REGISTRY: [fn() -> Box<dyn Platform>];

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::engine::HUMIDIFIER_BUCKETS;

    fn platforms() -> Vec<Box<dyn Platform>> {
        PLATFORM_REGISTRY.iter().map(|new| new()).collect()
    }

    #[test]
    fn every_bucket_has_a_platform() {
        let platforms = platforms();
        for bucket in CapabilityBucket::iter() {
            assert!(
                platforms.iter().any(|p| p.bucket() == bucket),
                "no platform serves bucket {bucket}"
            );
        }
    }

    /// The multi-bucket table and the platform model tables must agree: a
    /// model the classifier routes to a bucket has to be presentable by
    /// every platform serving that bucket, or its devices silently produce
    /// no entities there.
    #[test]
    fn classifier_table_models_are_recognized_by_their_platforms() {
        let platforms = platforms();
        for (model, buckets) in HUMIDIFIER_BUCKETS {
            for bucket in *buckets {
                for platform in platforms.iter().filter(|p| p.bucket() == *bucket) {
                    assert!(
                        platform.recognizes(model),
                        "platform {} serves {bucket} but does not recognize {model}",
                        platform.name()
                    );
                }
            }
        }
    }
}
