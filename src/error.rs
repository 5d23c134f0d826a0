use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch URL: {0}")]
    FetchError(String),

    #[error("No readable paragraph text found at the provided URL: {0}")]
    NoContentError(String),

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Failed to authenticate with Gemini. Please check your API key and permissions. ({0})")]
    AuthError(String),

    #[error("Model endpoint error: {0}")]
    RemoteError(String),

    #[error("Agent chat finished, but failed to extract a usable summary: {0}")]
    ExtractionError(String),

    #[error("Internal type error in the conversation layer: {0}")]
    TokenAccountingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::FetchError(_) => StatusCode::BAD_REQUEST,
            AppError::NoContentError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InputError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RemoteError(_) => StatusCode::BAD_GATEWAY,
            AppError::ExtractionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TokenAccountingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
