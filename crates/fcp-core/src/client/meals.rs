//! Meal logging endpoints.

use crate::client::core::FcpClient;
use crate::client::error::ClientError;
use crate::images::Resolution;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for creating a food log entry.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFoodLogRequest {
    /// Name of the dish.
    pub dish_name: String,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Meal type (breakfast, lunch, dinner, snack).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    /// Base64-encoded image content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    /// Image analysis resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl CreateFoodLogRequest {
    /// Create a request with just a dish name.
    pub fn new(dish_name: impl Into<String>) -> Self {
        Self {
            dish_name: dish_name.into(),
            description: None,
            meal_type: None,
            image_base64: None,
            resolution: None,
        }
    }
}

/// A food log entry returned by the server.
///
/// The server's response shape varies by analysis mode; unknown fields are
/// retained in `extra`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodLog {
    /// Server-assigned log ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Name of the logged dish.
    #[serde(default)]
    pub dish_name: Option<String>,
    /// Meal type.
    #[serde(default)]
    pub meal_type: Option<String>,
    /// Server message, if any.
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining response fields (nutrition analysis, timestamps, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl FcpClient {
    /// Create a food log entry on the server.
    pub async fn create_food_log(
        &self,
        request: &CreateFoodLogRequest,
    ) -> Result<FoodLog, ClientError> {
        let mut payload = serde_json::to_value(request)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("user_id".to_string(), Value::String(self.user_id().to_string()));
        }

        let response = self.request(Method::POST, "/meals", Some(&payload)).await?;
        serde_json::from_value(response).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
