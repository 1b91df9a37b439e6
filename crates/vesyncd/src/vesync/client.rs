use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;

use super::Category;
use super::Device;
use super::VendorCall;
use super::VendorRequest;
use super::VesyncError;
use crate::config::VesyncConfig;

/// Seam to the VeSync cloud.
///
/// The engine only ever talks to this trait: `fetch_devices` returns one
/// atomic snapshot or fails as a whole, and `send` executes a single
/// device-control call. A mock implementation backs the engine tests.
#[async_trait]
pub trait VesyncClient: Send + Sync {
    /// Authenticate and store the session for subsequent calls.
    async fn login(&mut self) -> Result<(), VesyncError>;

    /// Fetch the full device list with live attribute values.
    async fn fetch_devices(&self) -> Result<Vec<Device>, VesyncError>;

    /// Execute one control call against a device.
    async fn send(&self, request: &VendorRequest) -> Result<(), VesyncError>;
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    account_id: String,
}

/// HTTP client for the VeSync cloud API.
pub struct HttpVesyncClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: i64,
    msg: Option<String>,
    result: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, VesyncError> {
        if self.code != 0 {
            return Err(VesyncError::Api {
                code: self.code,
                msg: self.msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.result.ok_or(VesyncError::Api {
            code: 0,
            msg: "missing result payload".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
    #[serde(rename = "accountID")]
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct DeviceListResult {
    #[serde(default)]
    list: Vec<WireDevice>,
}

/// Device entry as it appears on the wire; mapped into [`Device`] with a
/// category derived from the model prefix.
#[derive(Debug, Deserialize)]
struct WireDevice {
    #[serde(rename = "deviceType")]
    device_type: String,
    #[serde(rename = "deviceName")]
    device_name: String,
    cid: String,
    #[serde(rename = "subDeviceNo", default)]
    sub_device_no: Option<u32>,
    #[serde(rename = "connectionStatus", default)]
    connection_status: Option<String>,
    #[serde(rename = "deviceStatus", default)]
    device_status: Option<String>,
    #[serde(rename = "deviceProp", default)]
    device_prop: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    extension: Option<BTreeMap<String, Value>>,
}

/// Model-prefix table assigning the vendor category (and, for wall
/// switches, the dimmable flag). First matching prefix wins, so the more
/// specific switch prefixes sort before "ESW".
static TYPE_PREFIX_CATEGORIES: &[(&str, Category, bool)] = &[
    ("ESWL", Category::Switch, false),
    ("ESWD", Category::Switch, true),
    ("ESD", Category::Switch, true),
    ("ESL", Category::Bulb, false),
    ("ESW", Category::Outlet, false),
    ("ESO", Category::Outlet, false),
    ("wifi-switch", Category::Outlet, false),
    ("LV-", Category::Fan, false),
    ("Core", Category::Fan, false),
    ("Classic", Category::Fan, false),
    ("Dual", Category::Fan, false),
    ("LUH", Category::Fan, false),
];

fn categorize(device_type: &str) -> Option<(Category, bool)> {
    TYPE_PREFIX_CATEGORIES
        .iter()
        .find(|(prefix, _, _)| device_type.starts_with(prefix))
        .map(|(_, category, dimmable)| (*category, *dimmable))
}

impl HttpVesyncClient {
    pub fn new(config: &VesyncConfig) -> Result<Self, VesyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: None,
        })
    }

    fn session(&self) -> Result<&Session, VesyncError> {
        self.session.as_ref().ok_or(VesyncError::NotLoggedIn)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, VesyncError> {
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_result()
    }

    fn device_from_wire(wire: WireDevice) -> Option<Device> {
        let Some((category, dimmable)) = categorize(&wire.device_type) else {
            debug!(
                "{} - unrecognized model {}, skipping",
                wire.device_name, wire.device_type
            );
            return None;
        };
        let mut details = wire.device_prop.unwrap_or_default();
        if let Some(extension) = wire.extension {
            details.extend(extension);
        }
        Some(Device {
            device_type: wire.device_type,
            device_name: wire.device_name,
            category,
            cid: wire.cid,
            sub_device_no: wire.sub_device_no,
            connection_status: wire.connection_status.unwrap_or_else(|| "offline".to_string()),
            device_status: wire.device_status.unwrap_or_else(|| "off".to_string()),
            dimmable,
            details,
        })
    }

    /// Map a control call onto the bypass command the cloud expects.
    fn json_cmd(call: &VendorCall) -> Value {
        match call {
            VendorCall::TurnOn => json!({"method": "deviceStatus", "data": {"status": "on"}}),
            VendorCall::TurnOff => json!({"method": "deviceStatus", "data": {"status": "off"}}),
            VendorCall::SetBrightness(pct) => {
                json!({"method": "brightness", "data": {"brightness": pct}})
            }
            VendorCall::SetColorTemp(pct) => {
                json!({"method": "colorTemperature", "data": {"colorTempe": pct}})
            }
            VendorCall::ManualMode => json!({"method": "mode", "data": {"mode": "manual"}}),
            VendorCall::AutoMode => json!({"method": "mode", "data": {"mode": "auto"}}),
            VendorCall::SleepMode => json!({"method": "mode", "data": {"mode": "sleep"}}),
            VendorCall::SetFanSpeed(level) => {
                json!({"method": "level", "data": {"type": "wind", "level": level}})
            }
            VendorCall::SetMistLevel(level) => {
                json!({"method": "level", "data": {"type": "mist", "level": level}})
            }
            VendorCall::SetHumidityMode(mode) => json!({"method": "mode", "data": {"mode": mode}}),
            VendorCall::SetTargetHumidity(humidity) => {
                json!({"method": "humidity", "data": {"humidity": humidity}})
            }
            VendorCall::SetDisplay(on) => json!({"method": "display", "data": {"state": on}}),
            VendorCall::SetNightLightBrightness(pct) => {
                json!({"method": "nightLightBrightness", "data": {"night_light_brightness": pct}})
            }
        }
    }
}

#[async_trait]
impl VesyncClient for HttpVesyncClient {
    async fn login(&mut self) -> Result<(), VesyncError> {
        let body = json!({
            "email": self.username,
            "password": format!("{:x}", md5::compute(self.password.as_bytes())),
            "devToken": "",
            "userType": "1",
            "method": "login",
        });
        let result: LoginResult = self.post("/cloud/v1/user/login", &body).await?;
        self.session = Some(Session {
            token: result.token,
            account_id: result.account_id,
        });
        debug!("logged in to the vesync cloud");
        Ok(())
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>, VesyncError> {
        let session = self.session()?;
        let body = json!({
            "method": "devices",
            "pageNo": "1",
            "pageSize": "100",
            "token": session.token,
            "accountID": session.account_id,
        });
        let result: DeviceListResult = self.post("/cloud/v1/deviceManaged/devices", &body).await?;
        Ok(result
            .list
            .into_iter()
            .filter_map(Self::device_from_wire)
            .collect())
    }

    async fn send(&self, request: &VendorRequest) -> Result<(), VesyncError> {
        let session = self.session()?;
        let mut cmd = Self::json_cmd(&request.call);
        cmd["source"] = json!("APP");
        let body = json!({
            "token": session.token,
            "accountID": session.account_id,
            "cid": request.cid,
            "subDeviceNo": request.sub_device_no,
            "jsonCmd": cmd,
        });
        let _: Value = self.post("/cloud/v1/deviceManaged/bypass", &body).await?;
        Ok(())
    }
}

/// Scripted client for engine tests: each `fetch_devices` pops the next
/// queued snapshot, and every control call is recorded.
#[cfg(test)]
pub(crate) struct MockVesyncClient {
    snapshots: std::sync::Mutex<std::collections::VecDeque<Result<Vec<Device>, VesyncError>>>,
    pub sent: std::sync::Mutex<Vec<VendorRequest>>,
}

#[cfg(test)]
impl MockVesyncClient {
    pub fn new() -> Self {
        Self {
            snapshots: std::sync::Mutex::new(std::collections::VecDeque::new()),
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn queue_snapshot(&self, devices: Vec<Device>) {
        self.snapshots.lock().unwrap().push_back(Ok(devices));
    }

    pub fn queue_failure(&self, error: VesyncError) {
        self.snapshots.lock().unwrap().push_back(Err(error));
    }
}

#[cfg(test)]
#[async_trait]
impl VesyncClient for MockVesyncClient {
    async fn login(&mut self) -> Result<(), VesyncError> {
        Ok(())
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>, VesyncError> {
        self.snapshots
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send(&self, request: &VendorRequest) -> Result<(), VesyncError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }
}
