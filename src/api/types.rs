use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::device::{Device, DeviceType};

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const NOT_NEGATIVE: &str = "This value should be greater than or equal to 0.";
pub const DEVICE_NOT_FOUND: &str = "Device not found.";
pub const UNAUTHORIZED_ACTION: &str = "Unauthorized action.";

// Fields are optional so that a missing value is reported next to the other
// field errors rather than as a body parse failure. Validator messages must
// be literals; they spell out NOT_BLANK / NOT_NEGATIVE.

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    #[serde(default)]
    #[validate(
        required(message = "This value should not be blank."),
        length(min = 1, message = "This value should not be blank.")
    )]
    pub identifier: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "This value should not be blank."),
        length(min = 1, message = "This value should not be blank.")
    )]
    pub token: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<DeviceType>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetIosBadgeRequest {
    #[serde(default)]
    #[validate(
        required(message = "This value should not be blank."),
        length(min = 1, message = "This value should not be blank.")
    )]
    pub identifier: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "This value should not be blank."),
        range(min = 0, message = "This value should be greater than or equal to 0.")
    )]
    pub badge_number: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveDeviceRequest {
    #[serde(default)]
    #[validate(
        required(message = "This value should not be blank."),
        length(min = 1, message = "This value should not be blank.")
    )]
    pub device_identifier: Option<String>,
    #[serde(default)]
    pub fcm_token: Option<String>,
    #[serde(rename = "userID", default)]
    pub user_id: Option<UserRef>,
}

/// User id as sent by clients, which use both JSON strings and numbers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserRef {
    Text(String),
    Number(i64),
}

impl UserRef {
    pub fn matches(&self, user_id: &str) -> bool {
        match self {
            UserRef::Text(s) => s.trim() == user_id,
            UserRef::Number(n) => n.to_string() == user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub status: bool,
    pub code: u16,
    pub message: &'static str,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            status: true,
            code: 200,
            message: "Success",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemovedDeviceResponse {
    #[serde(flatten)]
    pub base: SuccessResponse,
    pub device: Device,
}

impl RemovedDeviceResponse {
    pub fn new(device: Device) -> Self {
        Self {
            base: SuccessResponse::ok(),
            device,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{field_errors, FieldError};

    #[test]
    fn missing_register_fields_are_reported_together() {
        let req: RegisterDeviceRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            field_errors(&req),
            vec![
                FieldError::new("identifier", NOT_BLANK),
                FieldError::new("token", NOT_BLANK),
            ]
        );
    }

    #[test]
    fn register_accepts_type() {
        let req: RegisterDeviceRequest =
            serde_json::from_str(r#"{"identifier":"dev-1","token":"tok-A","type":"android"}"#)
                .unwrap();
        assert!(field_errors(&req).is_empty());
        assert_eq!(req.device_type, Some(DeviceType::Android));
    }

    #[test]
    fn register_type_ignores_case() {
        let req: RegisterDeviceRequest =
            serde_json::from_str(r#"{"identifier":"dev-1","token":"tok-A","type":"iOS"}"#)
                .unwrap();
        assert_eq!(req.device_type, Some(DeviceType::Ios));
    }

    #[test]
    fn negative_badge_is_rejected() {
        let req: SetIosBadgeRequest =
            serde_json::from_str(r#"{"identifier":"dev-1","badgeNumber":-2}"#).unwrap();
        assert_eq!(
            field_errors(&req),
            vec![FieldError::new("badgeNumber", NOT_NEGATIVE)]
        );
    }

    #[test]
    fn user_ref_accepts_strings_and_numbers() {
        let req: RemoveDeviceRequest =
            serde_json::from_str(r#"{"deviceIdentifier":"dev-1","userID":7}"#).unwrap();
        assert_eq!(req.user_id, Some(UserRef::Number(7)));
        assert!(req.user_id.as_ref().unwrap().matches("7"));

        let req: RemoveDeviceRequest =
            serde_json::from_str(r#"{"deviceIdentifier":"dev-1","userID":"u-1"}"#).unwrap();
        assert!(req.user_id.as_ref().unwrap().matches("u-1"));
        assert!(!req.user_id.as_ref().unwrap().matches("u-2"));
    }

    #[test]
    fn removed_device_response_flattens_envelope() {
        let value = serde_json::to_value(RemovedDeviceResponse::new(Device::new(None))).unwrap();
        assert_eq!(value["status"], true);
        assert_eq!(value["code"], 200);
        assert!(value["device"]["id"].is_string());
    }
}
