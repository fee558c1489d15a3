use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Link status reported to the frontend.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoogleStatusResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
