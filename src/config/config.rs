use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser sessions idle this long are dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub api_base: String,
    pub api_key: String,
    /// Sent as `HTTP-Referer` so the endpoint can attribute traffic.
    pub referer: String,
    /// Sent as `X-Title`.
    pub title: String,
    /// Selectable model identifiers. The first one is the default.
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_retrieval_triggers")]
    pub retrieval_triggers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    pub database_url: String,
    pub credential_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    pub realtime: Option<RealtimeConfig>,
    pub duckdb: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub store: StoreConfig,
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_retrieval_triggers() -> Vec<String> {
    vec!["show history".to_string(), "retrieve saved transcript".to_string()]
}

fn default_session_idle_minutes() -> u64 {
    60
}

fn default_collection() -> String {
    "chats".to_string()
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CHATRELAY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("llm.models")
                    .with_list_parse_key("chat.retrieval_triggers")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${OPENROUTER_API_KEY}
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.llm.api_key = expand_env(&app_config.llm.api_key);
        app_config.llm.api_base = expand_env(&app_config.llm.api_base);

        if let Some(ref mut realtime) = app_config.store.realtime {
            realtime.database_url = expand_env(&realtime.database_url);
            realtime.credential_file = expand_env(&realtime.credential_file);
        }
        if let Some(ref mut duckdb) = app_config.store.duckdb {
            duckdb.path = expand_env(&duckdb.path);
        }

        if app_config.llm.models.is_empty() {
            return Err(config::ConfigError::Message(
                "llm.models must list at least one model".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// The model preselected in the UI.
    pub fn default_model(&self) -> &str {
        self.llm.models.first().map(String::as_str).unwrap_or_default()
    }
}

pub fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| "".to_string())
    } else {
        val.to_string()
    }
}
