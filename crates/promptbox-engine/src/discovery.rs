//! Backend discovery.
//!
//! Checks whether the configured backend command can be found before the
//! user ever submits a prompt, so `promptbox doctor` can explain why
//! generations would fail.

use crate::config::BackendConfig;
use serde::{Deserialize, Serialize};

/// Result of looking up the backend command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend name.
    pub name: String,

    /// Program that would be executed.
    pub program: Option<String>,

    /// Whether the program was found.
    pub found: bool,

    /// Resolved path to the program, if found.
    pub path: Option<String>,

    /// Any issues detected.
    pub issues: Vec<String>,
}

/// Look up the backend's program on PATH.
pub fn discover_backend(config: &BackendConfig) -> BackendStatus {
    let mut status = BackendStatus {
        name: config.name.clone(),
        program: config.program().map(str::to_string),
        found: false,
        path: None,
        issues: Vec::new(),
    };

    let Some(program) = config.program() else {
        status.issues.push("command_argv is empty".into());
        return status;
    };

    match which::which(program) {
        Ok(path) => {
            status.found = true;
            status.path = Some(path.display().to_string());
        }
        Err(_) => {
            status.issues.push(format!("{program} not found on PATH"));
        }
    }

    if config.timeout_seconds == 0 {
        status
            .issues
            .push("timeout_seconds is 0; every generation will time out".into());
    }

    status
}
