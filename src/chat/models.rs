use serde::{Deserialize, Serialize};

/// One user message and the reply it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub bot: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self { user: user.into(), bot: bot.into() }
    }
}

/// In-memory state of one chat session.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Appends `turn` and returns it.
    pub fn push(&mut self, turn: Turn) -> &Turn {
        self.history.push(turn);
        &self.history[self.history.len() - 1]
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// The fixed set of selectable model identifiers. The first is the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCatalog {
    models: Vec<String>,
}

impl ModelCatalog {
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// The requested model if it is listed, the default when none was requested.
    pub fn resolve(&self, requested: Option<&str>) -> Option<&str> {
        match requested {
            Some(model) => self.models.iter().find(|m| m.as_str() == model).map(String::as_str),
            None => self.default_model(),
        }
    }
}
