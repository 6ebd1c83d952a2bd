use anyhow::Result;

use crate::{
    db::DBLayer,
    model::device::{Device, DeviceType},
};

/// Outcome of matching an incoming registration against stored devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An existing record matched on identifier or token.
    Found(Device),
    /// Nothing matched; a fresh, not yet persisted record.
    Created(Device),
}

impl Resolution {
    pub fn is_created(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }

    pub fn into_device(self) -> Device {
        match self {
            Resolution::Found(d) | Resolution::Created(d) => d,
        }
    }
}

/// Identifier first, then token, then a new device typed from `type_hint`.
pub async fn resolve_device(
    db: &DBLayer,
    identifier: &str,
    token: &str,
    type_hint: Option<DeviceType>,
) -> Result<Resolution> {
    if let Some(device) = db.find_device_by_identifier(identifier).await? {
        return Ok(Resolution::Found(device));
    }

    if let Some(device) = db.find_device_by_token(token).await? {
        return Ok(Resolution::Found(device));
    }

    Ok(Resolution::Created(Device::new(type_hint)))
}
