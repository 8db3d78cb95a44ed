use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::models::Turn;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
    pub default: Option<String>,
}
