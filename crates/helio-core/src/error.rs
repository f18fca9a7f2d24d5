use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HelioError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, HelioError>;
