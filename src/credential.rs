//! Token retrieval from the GitHub CLI
//!
//! The token is returned to the caller only. It is never logged and never
//! embedded in an error message.

use std::process::Stdio;

use log::debug;
use tokio::process::Command;

use crate::error::{LaunchError, Result};

/// Runs an external command (default `gh auth token`) and reads a token from its stdout
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    program: String,
    args: Vec<String>,
}

impl CredentialProvider {
    /// Build from a command line; the first element is the program
    pub fn from_command(command: &[String]) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self { program, args }
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fetch the token; any failure is a [`LaunchError::Credential`]
    pub async fn token(&self) -> Result<String> {
        if self.program.is_empty() {
            return Err(LaunchError::Credential(
                "no credential command configured".to_string(),
            ));
        }

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                LaunchError::Credential(format!("failed to execute {}: {e}", self.describe()))
            })?;

        if !output.status.success() {
            return Err(LaunchError::Credential(format!(
                "failed to get GitHub token: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(LaunchError::Credential(
                "received empty token from GitHub CLI".to_string(),
            ));
        }

        Ok(token)
    }

    /// Best-effort variant: `None` on any failure
    pub async fn try_token(&self) -> Option<String> {
        match self.token().await {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("Continuing without a token: {e}");
                None
            }
        }
    }
}
