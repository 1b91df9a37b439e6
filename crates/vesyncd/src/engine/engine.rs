use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::classify::classify;
use super::classify::HUMIDIFIER_BUCKETS;
use super::discovery::DeviceRegistry;
use super::discovery::DiscoveryEvent;
use super::entity::Entity;
use super::message::Command;
use super::message::CommandError;
use super::state::State;
use crate::platforms;
use crate::platforms::Platform;
use crate::vesync::Device;
use crate::vesync::VendorRequest;
use crate::vesync::VesyncClient;
use crate::vesync::VesyncError;

/// Owns the device registry, the entities built on top of it, and the
/// published state snapshot.
///
/// One poll cycle fetches a vendor snapshot, classifies it, folds it into the
/// registry, hands newly discovered devices to the platforms, refreshes every
/// entity, and atomically publishes a rebuilt [`State`]. A failed fetch
/// aborts the cycle before any of that: the registry, the entities, and the
/// last good snapshot all stay as they were.
pub struct Engine {
    registry: DeviceRegistry,
    platforms: Vec<Box<dyn Platform>>,
    entities: HashMap<String, Box<dyn Entity>>,
    state: ArcSwap<State>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let platforms: Vec<Box<dyn Platform>> =
            platforms::PLATFORM_REGISTRY.iter().map(|new| new()).collect();
        info!(
            platforms = platforms.len(),
            "engine initialized with registered platforms"
        );

        Engine {
            registry: DeviceRegistry::default(),
            platforms,
            entities: HashMap::new(),
            state: ArcSwap::from_pointee(State::default()),
        }
    }

    /// The most recently published state snapshot.
    pub fn state_snapshot(&self) -> Arc<State> {
        self.state.load_full()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Run one fetch/classify/discover/refresh cycle against the vendor.
    ///
    /// Callers sharing the engine behind a lock should fetch first and hold
    /// the lock only for [`Self::apply_snapshot`]; this combined form is for
    /// exclusive owners.
    pub async fn poll_once(&mut self, client: &dyn VesyncClient) -> Result<(), VesyncError> {
        let devices = client.fetch_devices().await?;
        self.apply_snapshot(&devices);
        Ok(())
    }

    /// Fold one fetched vendor snapshot into the engine: classify, diff,
    /// announce, refresh. Synchronous, so a shared engine lock is held only
    /// for in-memory work and never across a vendor call.
    pub fn apply_snapshot(&mut self, devices: &[Device]) {
        debug!(devices = devices.len(), "applying vendor snapshot");

        let classified = classify(devices, HUMIDIFIER_BUCKETS);
        debug!(buckets = %classified.summary(), "classified snapshot");
        let events = self.registry.apply(&classified);
        for event in &events {
            self.dispatch(event);
        }

        self.refresh_entities(devices);
    }

    fn dispatch(&mut self, event: &DiscoveryEvent) {
        let first = matches!(event, DiscoveryEvent::BucketDiscovered { .. });
        for platform in &self.platforms {
            if platform.bucket() != event.bucket() {
                continue;
            }

            info!(
                platform = platform.name(),
                devices = event.devices().len(),
                first,
                "dispatching discovered devices"
            );
            for entity in platform.create_entities(event.devices()) {
                let entity_id = entity.entity_id();
                if self.entities.insert(entity_id.clone(), entity).is_some() {
                    warn!(%entity_id, "replaced an already registered entity");
                } else {
                    debug!(%entity_id, "registered entity");
                }
            }
        }
    }

    /// Push the latest device snapshots into the entities and publish the
    /// rebuilt state. Entities whose device is offline stay registered but
    /// are withheld from the snapshot until it reconnects.
    fn refresh_entities(&mut self, devices: &[Device]) {
        let by_id: HashMap<String, &Device> = devices
            .iter()
            .map(|device| (device.unique_id(), device))
            .collect();

        let mut state = State::default();
        for entity in self.entities.values_mut() {
            if let Some(device) = by_id.get(&entity.device().unique_id()) {
                entity.refresh((*device).clone());
            }
            if !entity.available() {
                debug!(entity_id = %entity.entity_id(), "entity unavailable");
                continue;
            }
            state.insert(entity.entity_id(), entity.state());
        }

        self.state.store(Arc::new(state));
    }

    /// Translate a command into the vendor requests that perform it.
    ///
    /// The caller decides what to do with the requests; the engine itself
    /// never talks to the vendor here.
    pub fn handle_command(
        &self,
        entity_id: &str,
        command: &Command,
    ) -> Result<Vec<VendorRequest>, CommandError> {
        let entity = self
            .entities
            .get(entity_id)
            .ok_or_else(|| CommandError::UnknownEntity(entity_id.to_string()))?;

        let unsupported = |action: &'static str| CommandError::Unsupported {
            entity_id: entity_id.to_string(),
            action,
        };

        let calls = match command {
            Command::TurnOn => entity
                .as_toggleable()
                .ok_or_else(|| unsupported("turn_on"))?
                .turn_on(),
            Command::TurnOff => entity
                .as_toggleable()
                .ok_or_else(|| unsupported("turn_off"))?
                .turn_off(),
            Command::SetBrightness(brightness) => entity
                .as_brightness()
                .ok_or_else(|| unsupported("set_brightness"))?
                .set_brightness(*brightness),
            Command::SetColorTemp(mireds) => entity
                .as_color_temp()
                .ok_or_else(|| unsupported("set_color_temp"))?
                .set_color_temp(*mireds),
            Command::SetPercentage(percentage) => entity
                .as_speed()
                .ok_or_else(|| unsupported("set_percentage"))?
                .set_percentage(*percentage),
            Command::SetMode(mode) => entity
                .as_mode()
                .ok_or_else(|| unsupported("set_mode"))?
                .set_mode(mode)?,
            Command::SetTargetHumidity(humidity) => entity
                .as_humidity()
                .ok_or_else(|| unsupported("set_target_humidity"))?
                .set_humidity(*humidity),
        };

        let device = entity.device();
        Ok(calls
            .into_iter()
            .map(|call| VendorRequest::for_device(device, call))
            .collect())
    }
}
