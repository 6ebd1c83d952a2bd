use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Accepted case-insensitively from payloads and headers, written lowercase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DeviceType {
    Ios,
    Android,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Ios => "ios",
            DeviceType::Android => "android",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" => Ok(DeviceType::Ios),
            "android" => Ok(DeviceType::Android),
            other => Err(format!("unknown device type: {other}")),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A client endpoint that can receive push notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,          // UUID
    pub identifier: String,  // per-installation id
    pub token: String,       // FCM / APNs delivery token, may rotate
    #[serde(rename = "type", default)]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub badge_number: i64,
    #[serde(default)]
    pub user_id: Option<String>, // last authenticated owner
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl Device {
    /// Blank record for a device seen for the first time.
    pub fn new(device_type: Option<DeviceType>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            identifier: String::new(),
            token: String::new(),
            device_type,
            badge_number: 0,
            user_id: None,
            created_ts: now,
            updated_ts: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_type_case_insensitively() {
        assert_eq!("iOS".parse::<DeviceType>(), Ok(DeviceType::Ios));
        assert_eq!(" android ".parse::<DeviceType>(), Ok(DeviceType::Android));
        assert!("windows".parse::<DeviceType>().is_err());
    }

    #[test]
    fn deserializes_device_type_case_insensitively() {
        let parsed: DeviceType = serde_json::from_str(r#""iOS""#).unwrap();
        assert_eq!(parsed, DeviceType::Ios);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""ios""#);
        assert!(serde_json::from_str::<DeviceType>(r#""windows""#).is_err());
    }

    #[test]
    fn serializes_with_wire_names() {
        let mut device = Device::new(Some(DeviceType::Ios));
        device.identifier = "dev-1".into();
        device.token = "tok-A".into();
        device.badge_number = 3;

        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value["type"], "ios");
        assert_eq!(value["badgeNumber"], 3);
        assert_eq!(value["identifier"], "dev-1");
        assert!(value["userId"].is_null());
    }

    #[test]
    fn new_device_starts_without_badge_or_owner() {
        let device = Device::new(None);
        assert_eq!(device.badge_number, 0);
        assert!(device.user_id.is_none());
        assert!(device.device_type.is_none());
        assert_eq!(device.created_ts, device.updated_ts);
    }
}
