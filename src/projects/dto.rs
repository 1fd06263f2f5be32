use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::text;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[serde(default, deserialize_with = "text")]
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
