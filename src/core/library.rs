use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // A retry-able error raised when the backing store is throttling or temporarily
    // unreachable. The caller can retry with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
    // Failure talking to an external bibliographic service (connect, timeout, bad status).
    Transport {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // The caller gave up on the request; never to be treated as an empty result.
    Cancelled {
        message: String,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn access_denied(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                LibraryError::access_denied(
                    format!("access-denied error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn transport(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Transport { message: message.to_string(), reason_code, retryable }
    }

    pub fn cancelled(message: &str) -> LibraryError {
        LibraryError::Cancelled { message: message.to_string() }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::AccessDenied { .. } => { false }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
            LibraryError::Transport { retryable, .. } => { *retryable }
            LibraryError::Cancelled { .. } => { false }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LibraryError::Cancelled { .. })
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::AccessDenied { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Transport { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Cancelled { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/// A specialized Result type for the lookup services.
pub type LibraryResult<T> = Result<T, LibraryError>;

// CatalogSource tags every catalog record with the system it came from.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum CatalogSource {
    Local,
    GoogleBooks,
    OpenLibrary,
}

impl CatalogSource {
    // prefix used in composite ids, e.g. `local:42`
    pub fn prefix(&self) -> &'static str {
        match self {
            CatalogSource::Local => "local",
            CatalogSource::GoogleBooks => "google",
            CatalogSource::OpenLibrary => "openlibrary",
        }
    }

    // accepts the canonical prefixes and the short legacy ones (`l`, `g`, `o`)
    pub fn from_prefix(prefix: &str) -> Option<CatalogSource> {
        match prefix.trim().to_ascii_lowercase().as_str() {
            "local" | "l" => Some(CatalogSource::Local),
            "google" | "g" => Some(CatalogSource::GoogleBooks),
            "openlibrary" | "o" => Some(CatalogSource::OpenLibrary),
            _ => None,
        }
    }
}

impl From<String> for CatalogSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Local" => CatalogSource::Local,
            "GoogleBooks" => CatalogSource::GoogleBooks,
            "OpenLibrary" => CatalogSource::OpenLibrary,
            _ => CatalogSource::Local,
        }
    }
}

impl Display for CatalogSource {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CatalogSource::Local => write!(f, "Local"),
            CatalogSource::GoogleBooks => write!(f, "GoogleBooks"),
            CatalogSource::OpenLibrary => write!(f, "OpenLibrary"),
        }
    }
}
