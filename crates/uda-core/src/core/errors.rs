use std::io;
use std::path::PathBuf;

use serde_json::{json, Map, Value};
use uda_domain::NameError;

/// Failure kinds surfaced to the command layer.
#[derive(Debug, thiserror::Error)]
pub enum UdaError {
    #[error("environment {0} does not exist")]
    EnvNotFound(String),
    #[error("environment {0} already exists")]
    AlreadyExists(String),
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("no environment selected, pass --env or activate one")]
    NoTargetEnv,
    #[error("uv not found, run 'uda self install' to install")]
    ToolNotFound,
    #[error("no working mirror found")]
    NoWorkingMirror,
    #[error("{command} failed{}", exit_suffix(.code))]
    ExternalTool { command: String, code: Option<i32> },
    #[error("download failed: {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidName,
    ExternalToolFailure,
    NetworkFailure,
    IoFailure,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::ExternalToolFailure => "external_tool_failure",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::IoFailure => "io_failure",
        }
    }
}

impl UdaError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: None,
            source,
        }
    }

    pub fn io_at(context: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: Some(path.into()),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            UdaError::EnvNotFound(_)
            | UdaError::NoTargetEnv
            | UdaError::ToolNotFound
            | UdaError::NoWorkingMirror => ErrorKind::NotFound,
            UdaError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            UdaError::InvalidName(_) => ErrorKind::InvalidName,
            UdaError::ExternalTool { .. } => ErrorKind::ExternalToolFailure,
            UdaError::Network { .. } => ErrorKind::NetworkFailure,
            UdaError::Io { .. } => ErrorKind::IoFailure,
        }
    }

    /// Errors the user can fix by changing their input or setup.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::AlreadyExists | ErrorKind::InvalidName
        )
    }

    #[must_use]
    pub fn details(&self) -> Value {
        let mut map = Map::new();
        map.insert("reason".into(), Value::String(self.kind().as_str().into()));
        match self {
            UdaError::EnvNotFound(name) | UdaError::AlreadyExists(name) => {
                map.insert("env".into(), Value::String(name.clone()));
            }
            UdaError::ToolNotFound => {
                map.insert("hint".into(), Value::String("run `uda self install`".into()));
            }
            UdaError::NoTargetEnv => {
                map.insert("hint".into(), Value::String("uda activate <name>".into()));
            }
            UdaError::ExternalTool { command, code } => {
                map.insert("command".into(), Value::String(command.clone()));
                map.insert("code".into(), json!(code));
            }
            UdaError::Network { url, .. } => {
                map.insert("url".into(), Value::String(url.clone()));
            }
            UdaError::Io {
                path: Some(path), ..
            } => {
                map.insert("path".into(), Value::String(path.display().to_string()));
            }
            UdaError::InvalidName(_) | UdaError::NoWorkingMirror | UdaError::Io { .. } => {}
        }
        Value::Object(map)
    }
}
