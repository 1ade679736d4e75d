pub mod answerer;
pub mod backend;
pub mod config;
pub mod retry;
pub mod telegram;
pub mod telemetry;

pub use answerer::{QueryError, QueryService, format_answer};
pub use backend::{AnswerResponse, AskClient, AskClientBuilder, AskClientTrait, BackendError, Document};
pub use config::{AllowList, Config, ConfigError};
pub use retry::RetryPolicy;
