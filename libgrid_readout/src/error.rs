use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config was given an invalid run range [{0}, {1}]; expected 1 <= first <= last")]
    BadRunRange(u32, u32),
}

#[derive(Debug, Error)]
pub enum LogFileError {
    #[error("Could not open log file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Log file failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Decoder failed due to log file error: {0}")]
    FileError(#[from] LogFileError),
    #[error("Decoder failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Run range [{0}, {1}] selects none of the {2} runs found in the log")]
    EmptyRunSelection(u32, u32, u32),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to decode error: {0}")]
    DecodeError(#[from] DecodeError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to log file error: {0}")]
    FileError(#[from] LogFileError),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
