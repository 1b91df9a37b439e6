mod classify;
mod discovery;
// Private module - module inception kept to mirror the crate layout.
#[allow(clippy::module_inception)]
mod engine;
mod entity;
mod message;
pub mod state;

pub use classify::CapabilityBucket;
pub use classify::Classified;
pub use classify::HUMIDIFIER_BUCKETS;
pub use engine::Engine;
pub use entity::entity_id;
pub use entity::BrightnessAdjustable;
pub use entity::ColorTempAdjustable;
pub use entity::Entity;
pub use entity::EntityBase;
pub use entity::HumidityAdjustable;
pub use entity::ModeAdjustable;
pub use entity::SpeedAdjustable;
pub use entity::Toggleable;
pub use message::Command;
pub use message::CommandError;
pub use state::EntityState;
