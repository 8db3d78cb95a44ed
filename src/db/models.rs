use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::chat::models::Turn;

/// Format of `ChatRecord::timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A saved snapshot of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub model: String,
    pub timestamp: String,
    // The realtime database drops empty arrays, so an empty save comes back without `chat`.
    #[serde(default)]
    pub chat: Vec<Turn>,
}

impl ChatRecord {
    pub fn new<Tz: TimeZone>(history: &[Turn], model: &str, saved_at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            model: model.to_string(),
            timestamp: saved_at.format(TIMESTAMP_FORMAT).to_string(),
            chat: history.to_vec(),
        }
    }
}
