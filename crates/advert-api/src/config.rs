use std::str::FromStr;

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Status code used when a write hits the unique `header` index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictStatus {
    /// 409 Conflict.
    #[default]
    Conflict,
    /// 408 Request Timeout, for clients written against the legacy service.
    RequestTimeout,
}

impl ConflictStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            ConflictStatus::Conflict => StatusCode::CONFLICT,
            ConflictStatus::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl FromStr for ConflictStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "409" | "conflict" => Ok(ConflictStatus::Conflict),
            "408" | "legacy" => Ok(ConflictStatus::RequestTimeout),
            _ => Err(()),
        }
    }
}

/// Which fields a read returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadView {
    /// `{id, header, description, user}`
    #[default]
    Full,
    /// `{id, header}`
    Summary,
}

impl FromStr for ReadView {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(ReadView::Full),
            "summary" => Ok(ReadView::Summary),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub conflict_status: ConflictStatus,
    pub read_view: ReadView,
    /// Compare the path user against the claimed (update) or stored (delete) owner.
    pub enforce_ownership: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            conflict_status: ConflictStatus::default(),
            read_view: ReadView::default(),
            enforce_ownership: true,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset keys keep their defaults,
    /// unparseable ones are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("ADVERT_CONFLICT_STATUS") {
            config.conflict_status = value.parse().map_err(|_| ConfigError::Invalid {
                key: "ADVERT_CONFLICT_STATUS",
                value,
                expected: "409 or 408",
            })?;
        }

        if let Some(value) = lookup("ADVERT_READ_VIEW") {
            config.read_view = value.parse().map_err(|_| ConfigError::Invalid {
                key: "ADVERT_READ_VIEW",
                value,
                expected: "full or summary",
            })?;
        }

        if let Some(value) = lookup("ADVERT_ENFORCE_OWNERSHIP") {
            config.enforce_ownership = parse_bool(&value).ok_or(ConfigError::Invalid {
                key: "ADVERT_ENFORCE_OWNERSHIP",
                value,
                expected: "true or false",
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
