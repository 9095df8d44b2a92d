use log::debug;
use std::fs::read_to_string;
use std::path::PathBuf;
use thiserror::Error;
use yup_oauth2::ServiceAccountKey;

use crate::config::CredentialsConfig;

/// Read-only access to calendars
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credentials: ${env_var} is not set and {} could not be read: {source}", path.display())]
    Missing {
        env_var: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed service account key in {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that can hand out a service-account key
pub trait CredentialSource {
    fn service_account_key(&self) -> Result<ServiceAccountKey, CredentialError>;
}

/// Environment variable first, local key file second
#[derive(Debug, Clone)]
pub struct EnvOrFileCredentials {
    env_var: String,
    path: PathBuf,
}

impl EnvOrFileCredentials {
    pub fn new(env_var: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            path: path.into(),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(config.env_var.clone(), config.path.clone())
    }
}

impl CredentialSource for EnvOrFileCredentials {
    fn service_account_key(&self) -> Result<ServiceAccountKey, CredentialError> {
        // An empty variable counts as unset
        if let Some(blob) = std::env::var(&self.env_var).ok().filter(|v| !v.trim().is_empty()) {
            debug!("Using credentials from ${}", self.env_var);
            return parse_key(&blob, format!("${}", self.env_var));
        }

        debug!("${} not set, reading {}", self.env_var, self.path.display());
        let blob = read_to_string(&self.path).map_err(|source| CredentialError::Missing {
            env_var: self.env_var.clone(),
            path: self.path.clone(),
            source,
        })?;

        parse_key(&blob, self.path.display().to_string())
    }
}

fn parse_key(blob: &str, origin: String) -> Result<ServiceAccountKey, CredentialError> {
    serde_json::from_str(blob).map_err(|source| CredentialError::Malformed { origin, source })
}
