use super::Device;

/// A single device-control call in vendor-native units.
///
/// Entities translate normalized commands into these; the client maps them
/// onto cloud endpoints. Percent values are already clamped to the vendor
/// range by the entity that produced the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorCall {
    TurnOn,
    TurnOff,
    /// Brightness percent, 1-100.
    SetBrightness(u8),
    /// Color-temperature percent, 0-100, warm-high.
    SetColorTemp(u8),
    ManualMode,
    AutoMode,
    SleepMode,
    /// Fan speed level within [`crate::units::SPEED_RANGE`].
    SetFanSpeed(u8),
    /// Humidifier mist level (manual low/mid/high map to 3/6/9).
    SetMistLevel(u8),
    SetHumidityMode(String),
    /// Target humidity percent, 30-80.
    SetTargetHumidity(u8),
    SetDisplay(bool),
    /// Night-light brightness percent; 0 turns the night light off.
    SetNightLightBrightness(u8),
}

/// A [`VendorCall`] addressed to one physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRequest {
    pub cid: String,
    pub sub_device_no: Option<u32>,
    pub call: VendorCall,
}

impl VendorRequest {
    pub fn for_device(device: &Device, call: VendorCall) -> Self {
        Self {
            cid: device.cid.clone(),
            sub_device_no: device.sub_device_no,
            call,
        }
    }
}
