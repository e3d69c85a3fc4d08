use thiserror::Error;

pub type VizResult<T> = Result<T, VizError>;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("invalid canvas size: width={width}, height={height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid tool mode `{0}`: expected one of pan, box, lasso")]
    InvalidTool(String),

    #[error("{worker} worker failed: {message}")]
    WorkerFailed {
        worker: &'static str,
        message: String,
    },

    #[error("visualization is unusable after a worker failure: {0}")]
    Poisoned(String),
}

impl VizError {
    pub(crate) fn worker(worker: &'static str, message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            worker,
            message: message.into(),
        }
    }
}
