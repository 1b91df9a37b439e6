use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

/// Vendor-assigned device category, derived from the model identifier by
/// the cloud client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Fan,
    Bulb,
    Outlet,
    Switch,
}

/// One device as reported by a single poll of the cloud API.
///
/// Created fresh on every poll and never mutated; the next poll's object for
/// the same id supersedes it. `unique_id` is unique within one snapshot but
/// a sub-device shares its parent `cid`, disambiguated by `sub_device_no`.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Vendor model identifier, e.g. "Classic300S".
    pub device_type: String,
    pub device_name: String,
    pub category: Category,
    pub cid: String,
    pub sub_device_no: Option<u32>,
    /// "online" when the device is reachable from the cloud.
    pub connection_status: String,
    /// "on" or "off"; humidifiers report "on" permanently and use the
    /// `enabled` detail instead.
    pub device_status: String,
    /// Only meaningful for category [`Category::Switch`].
    pub dimmable: bool,
    /// Live attribute values that rode along with the snapshot.
    pub details: BTreeMap<String, Value>,
}

impl Device {
    /// Stable identifier: connection id plus optional sub-device index.
    pub fn unique_id(&self) -> String {
        match self.sub_device_no {
            Some(no) => format!("{}{}", self.cid, no),
            None => self.cid.clone(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.connection_status == "online"
    }

    pub fn is_on(&self) -> bool {
        self.device_status == "on"
    }

    /// Humidifier-family power flag.
    pub fn enabled(&self) -> bool {
        self.detail_bool("enabled").unwrap_or(false)
    }

    /// Read a numeric detail. Missing keys yield `None` silently; a value
    /// that is present but non-numeric also yields `None` after logging, so
    /// one malformed device attribute never aborts a poll cycle.
    pub fn detail_i64(&self, key: &str) -> Option<i64> {
        let value = self.details.get(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            debug!(
                "{} - unexpected '{}' value from the vesync api: {}",
                self.device_name, key, value
            );
        }
        parsed
    }

    /// Read a boolean detail, with the same tolerance as [`Self::detail_i64`].
    pub fn detail_bool(&self, key: &str) -> Option<bool> {
        let value = self.details.get(key)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            _ => None,
        };
        if parsed.is_none() {
            debug!(
                "{} - unexpected '{}' value from the vesync api: {}",
                self.device_name, key, value
            );
        }
        parsed
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Build a minimal device for tests.
    pub fn device(device_type: &str, category: Category, cid: &str) -> Device {
        Device {
            device_type: device_type.to_string(),
            device_name: format!("{} {}", device_type, cid),
            category,
            cid: cid.to_string(),
            sub_device_no: None,
            connection_status: "online".to_string(),
            device_status: "on".to_string(),
            dimmable: false,
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut device: Device, key: &str, value: Value) -> Device {
        device.details.insert(key.to_string(), value);
        device
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testutil::{device, with_detail};
    use super::*;

    #[test]
    fn unique_id_appends_sub_device_index() {
        let mut dev = device("ESW15-USA", Category::Outlet, "abc123");
        assert_eq!(dev.unique_id(), "abc123");
        dev.sub_device_no = Some(2);
        assert_eq!(dev.unique_id(), "abc1232");
    }

    #[test]
    fn numeric_details_accept_number_and_string() {
        let dev = with_detail(
            device("ESL100", Category::Bulb, "b1"),
            "brightness",
            json!(42),
        );
        assert_eq!(dev.detail_i64("brightness"), Some(42));

        let dev = with_detail(
            device("ESL100", Category::Bulb, "b1"),
            "brightness",
            json!("55"),
        );
        assert_eq!(dev.detail_i64("brightness"), Some(55));
    }

    #[test]
    fn malformed_numeric_detail_yields_none() {
        let dev = with_detail(
            device("ESL100", Category::Bulb, "b1"),
            "brightness",
            json!("not-a-number"),
        );
        assert_eq!(dev.detail_i64("brightness"), None);
        assert_eq!(dev.detail_i64("missing"), None);
    }

    #[test]
    fn malformed_bool_detail_yields_none() {
        let dev = with_detail(
            device("Classic300S", Category::Fan, "h1"),
            "water_lacks",
            json!("maybe"),
        );
        assert_eq!(dev.detail_bool("water_lacks"), None);

        let dev = with_detail(
            device("Classic300S", Category::Fan, "h1"),
            "water_lacks",
            json!(1),
        );
        assert_eq!(dev.detail_bool("water_lacks"), Some(true));
    }
}
