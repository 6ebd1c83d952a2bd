use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::{
    api::{
        auth::AuthenticatedUser,
        extract::{JsonBody, RequestFrom},
        types::{
            RegisterDeviceRequest, RemoveDeviceRequest, RemovedDeviceResponse, SetIosBadgeRequest,
            SuccessResponse, DEVICE_NOT_FOUND, UNAUTHORIZED_ACTION,
        },
        AppState,
    },
    error::{field_errors, ApiError, FieldError},
    model::device::DeviceType,
    resolver::resolve_device,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/devices/register", post(register_device))
        .route("/api/devices/ios-badge", post(set_ios_badge))
        .route("/api/devices/remove", post(remove_user_device))
}

pub async fn register_device(
    State(state): State<AppState>,
    RequestFrom(type_hint): RequestFrom,
    user: Option<AuthenticatedUser>,
    JsonBody(payload): JsonBody<RegisterDeviceRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let errors = field_errors(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let identifier = payload.identifier.unwrap_or_default();
    let token = payload.token.unwrap_or_default();

    let resolution = resolve_device(&state.db, &identifier, &token, type_hint).await?;
    let created = resolution.is_created();
    let mut device = resolution.into_device();

    device.identifier = identifier;
    device.token = token;
    if let Some(device_type) = payload.device_type {
        device.device_type = Some(device_type);
    }
    if let Some(user) = user {
        device.user_id = Some(user.user_id);
    }
    device.updated_ts = chrono::Utc::now().timestamp();

    state.db.save_device(&device).await?;

    info!(
        device_id = %device.id,
        created,
        user_id = device.user_id.as_deref().unwrap_or("-"),
        "device registered"
    );
    Ok(Json(SuccessResponse::ok()))
}

pub async fn set_ios_badge(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SetIosBadgeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let errors = field_errors(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let identifier = payload.identifier.unwrap_or_default();
    let mut device = state
        .db
        .find_device_by_identifier_and_type(&identifier, DeviceType::Ios)
        .await?
        .ok_or_else(|| ApiError::NotFound(DEVICE_NOT_FOUND.into()))?;

    device.badge_number = payload.badge_number.unwrap_or_default();
    device.updated_ts = chrono::Utc::now().timestamp();
    state.db.save_device(&device).await?;

    info!(device_id = %device.id, badge = device.badge_number, "ios badge updated");
    Ok(Json(SuccessResponse::ok()))
}

/// Unregister one of the caller's devices. Field validation, the ownership
/// check and the lookup all report into one error list.
pub async fn remove_user_device(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<RemoveDeviceRequest>,
) -> Result<Json<RemovedDeviceResponse>, ApiError> {
    let mut errors = field_errors(&payload);

    let owns_request = payload
        .user_id
        .as_ref()
        .map(|requested| requested.matches(&user.user_id))
        .unwrap_or(false);
    if !owns_request {
        errors.push(FieldError::new("userID", UNAUTHORIZED_ACTION));
    }

    // A blank identifier was already reported above.
    let identifier = payload.device_identifier.as_deref().unwrap_or_default();
    let device = if identifier.is_empty() {
        None
    } else {
        let found = match payload.fcm_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                state
                    .db
                    .find_device_by_identifier_and_token(identifier, token)
                    .await?
            }
            None => state.db.find_device_by_identifier(identifier).await?,
        };
        if found.is_none() {
            errors.push(FieldError::new("deviceIdentifier", DEVICE_NOT_FOUND));
        }
        found
    };

    let device = match device {
        Some(device) if errors.is_empty() => device,
        _ => return Err(ApiError::Validation(errors)),
    };

    state.db.delete_device(&device.id).await?;

    info!(device_id = %device.id, user_id = %user.user_id, "device removed");
    Ok(Json(RemovedDeviceResponse::new(device)))
}
