use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, SpecterError>;

#[derive(Error, Debug)]
pub enum SpecterError {
    #[error("could not find application '{application}' required to run this command; install it and try again")]
    AppDependencyNotFound { application: String },

    #[error("failed to execute operation '{operation}': {application} exited with {status}")]
    SubprocessExecution {
        operation: String,
        application: String,
        status: ExitStatus,
    },

    #[error("failed to launch {application}: {source}")]
    Spawn {
        application: String,
        #[source]
        source: io::Error,
    },

    #[error("missing <{element}> element under <{parent}> in {}", path.display())]
    MissingElement {
        element: &'static str,
        parent: &'static str,
        path: PathBuf,
    },

    #[error("missing '{attribute}' attribute on <{element}> in {}", path.display())]
    MissingAttribute {
        attribute: &'static str,
        element: &'static str,
        path: PathBuf,
    },

    #[error("invalid IP address '{value}' in {}", path.display())]
    InvalidAddress { value: String, path: PathBuf },

    #[error("invalid port id '{value}' in {}", path.display())]
    InvalidPort { value: String, path: PathBuf },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("file path \"{}\" is not valid: {reason}", path.display())]
    InputFile { path: PathBuf, reason: String },

    #[error("path \"{}\" could not be written to; check the work directory permissions", path.display())]
    NotWritable { path: PathBuf },

    #[error("work directory error: {message}")]
    Workdir { message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SpecterError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
