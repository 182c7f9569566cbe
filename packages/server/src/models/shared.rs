use serde::Serialize;

/// Image reported for a model that has none.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

pub fn image_or_placeholder(image: Option<&str>) -> String {
    image.unwrap_or(PLACEHOLDER_IMAGE).to_string()
}

/// Result of a publish, update or delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OutcomeResponse {
    /// Id of the affected model.
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Model published successfully!")]
    pub message: String,
}

impl OutcomeResponse {
    pub fn new(id: i32, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
        }
    }
}
