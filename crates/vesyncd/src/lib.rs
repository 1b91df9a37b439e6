use std::sync::Arc;

pub mod api;
pub mod config;
pub mod poller;
pub mod units;

mod engine;
mod platforms;
mod vesync;

pub use config::Config;
pub use config::LogLevel;
pub use engine::state::State;
pub use engine::BrightnessAdjustable;
pub use engine::CapabilityBucket;
pub use engine::ColorTempAdjustable;
pub use engine::Command;
pub use engine::CommandError;
pub use engine::Engine;
pub use engine::Entity;
pub use engine::EntityState;
pub use engine::HumidityAdjustable;
pub use engine::ModeAdjustable;
pub use engine::SpeedAdjustable;
pub use engine::Toggleable;
pub use vesync::HttpVesyncClient;
pub use vesync::VesyncClient;

/// Engine shared between the poller (writer) and the API (reader).
pub type SharedEngine = Arc<tokio::sync::RwLock<Engine>>;
