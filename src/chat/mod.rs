pub mod completion;
pub mod models;
pub mod session;

pub use completion::{CompletionClient, CompletionOutcome};
pub use models::{ChatSession, ModelCatalog, Turn};
pub use session::{SessionController, SessionRegistry, SetupError, DEFAULT_IDLE_TIMEOUT};
