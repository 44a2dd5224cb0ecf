use thiserror::Error;

/// Shown when the upstream gateway answers 429.
pub const RATE_LIMIT_MESSAGE: &str = "Слишком много запросов, попробуйте позже.";
/// Shown when the upstream gateway answers 402.
pub const CREDITS_MESSAGE: &str = "Необходимо пополнить кредиты.";
/// Shown for every other upstream failure. Details stay in the server log.
pub const SERVICE_ERROR_MESSAGE: &str = "Ошибка AI сервиса";
/// Client fallback when an error response carries no readable message.
pub const FALLBACK_CLIENT_MESSAGE: &str = "Не удалось получить ответ от сервера";

/// Top-level error type for IdeaForge.
#[derive(Debug, Error)]
pub enum IdeaError {
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("Поле темы не может быть пустым")]
    EmptyTopic,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{}", CREDITS_MESSAGE)]
    PaymentRequired,

    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdeaError {
    /// HTTP status the relay answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            IdeaError::RateLimited => 429,
            IdeaError::PaymentRequired => 402,
            _ => 500,
        }
    }

    /// Message safe to hand to the end user.
    pub fn client_message(&self) -> String {
        match self {
            IdeaError::UpstreamStatus { .. } | IdeaError::Transport(_) => {
                SERVICE_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Map a non-success upstream status to the matching variant.
    pub fn from_upstream(status: u16, body: impl Into<String>) -> Self {
        match status {
            429 => IdeaError::RateLimited,
            402 => IdeaError::PaymentRequired,
            status => IdeaError::UpstreamStatus {
                status,
                body: body.into(),
            },
        }
    }
}
