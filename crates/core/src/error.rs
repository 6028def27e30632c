#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("reference data file not found: {}", .0.display())]
    DataFileMissing(std::path::PathBuf),
    #[error("failed to read reference data: {0}")]
    DataFileRead(std::io::Error),
    #[error("failed to parse reference data: {0}")]
    DataFileParse(serde_json::Error),
    #[error("reference data is invalid: {0}")]
    DataInvalid(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
