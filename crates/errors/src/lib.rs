use thiserror::Error;


#[derive(Debug, Error)]
pub enum SignageError {
    #[error("widget {widget} cannot {operation} while {from}")]
    InvalidTransition {
        widget: String,
        from: String,
        operation: String,
    },
    #[error("widget {widget} is already running a lifecycle transition")]
    TransitionInProgress { widget: String },
    #[error("scheduler error: {0}")]
    Scheduler(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("data fetch error: {0}")]
    DataFetch(String),
    #[error("subscription error: {0}")]
    Subscription(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type SignageResult<T> = Result<T, SignageError>;

impl SignageError {
    pub fn invalid_transition<W, F, O>(widget: W, from: F, operation: O) -> Self
    where
        W: Into<String>,
        F: Into<String>,
        O: Into<String>,
    {
        Self::InvalidTransition {
            widget: widget.into(),
            from: from.into(),
            operation: operation.into(),
        }
    }
    pub fn transition_in_progress<S: Into<String>>(widget: S) -> Self {
        Self::TransitionInProgress {
            widget: widget.into(),
        }
    }
    pub fn scheduler_error<S: Into<String>>(msg: S) -> Self {
        Self::Scheduler(msg.into())
    }
    pub fn render_error<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }
    pub fn fetch_error<S: Into<String>>(msg: S) -> Self {
        Self::DataFetch(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    /// Errors a later trigger (timer tick or push event) may succeed on.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SignageError::DataFetch(_)
                | SignageError::Render(_)
                | SignageError::Subscription(_)
                | SignageError::TransitionInProgress { .. }
        )
    }
    /// Errors caused by the driver calling an operation out of order.
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            SignageError::InvalidTransition { .. } | SignageError::TransitionInProgress { .. }
        )
    }
}

impl From<serde_json::Error> for SignageError {
    fn from(err: serde_json::Error) -> Self {
        SignageError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SignageError {
    fn from(err: anyhow::Error) -> Self {
        SignageError::Internal(err.to_string())
    }
}
