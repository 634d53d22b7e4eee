//! Fixed failure taxonomies. Classification is pure and never performs I/O.

use crate::remote::RemoteError;

/// Why an authentication attempt failed, as far as the user needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    EmailExists,
    EmailNotFound,
    InvalidPassword,
    Unknown,
}

impl AuthFailure {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("EMAIL_EXISTS") => AuthFailure::EmailExists,
            Some("EMAIL_NOT_FOUND") => AuthFailure::EmailNotFound,
            Some("INVALID_PASSWORD") => AuthFailure::InvalidPassword,
            _ => AuthFailure::Unknown,
        }
    }

    /// Transport and decoding failures are always `Unknown`.
    pub fn classify(error: &RemoteError) -> Self {
        match error {
            RemoteError::Rejected { code, .. } => Self::from_code(code.as_deref()),
            RemoteError::Http(_) | RemoteError::Malformed(_) => AuthFailure::Unknown,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::EmailExists => "This email exists already",
            AuthFailure::EmailNotFound => "This email does not exist.",
            AuthFailure::InvalidPassword => "This password is not correct.",
            AuthFailure::Unknown => "An unknown error occurred!",
        }
    }
}

/// Why a collection read or write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFailure {
    Malformed,
    Network,
    Rejected(u16),
    Unauthorized,
}

impl CollectionFailure {
    pub fn classify(error: &RemoteError) -> Self {
        match error {
            RemoteError::Rejected {
                status: 401 | 403, ..
            } => CollectionFailure::Unauthorized,
            RemoteError::Rejected { status, .. } => CollectionFailure::Rejected(*status),
            RemoteError::Http(e) if e.is_decode() => CollectionFailure::Malformed,
            RemoteError::Http(_) => CollectionFailure::Network,
            RemoteError::Malformed(_) => CollectionFailure::Malformed,
        }
    }

    pub fn message(self) -> String {
        match self {
            CollectionFailure::Malformed => "The server sent data that could not be read.".to_string(),
            CollectionFailure::Network => "The server could not be reached.".to_string(),
            CollectionFailure::Rejected(status) => {
                format!("The server rejected the request (status {status}).")
            }
            CollectionFailure::Unauthorized => {
                "You are not allowed to access this data. Please log in again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(code: Option<&str>, status: u16) -> RemoteError {
        RemoteError::Rejected {
            code: code.map(str::to_string),
            status,
        }
    }

    #[test]
    fn test_auth_code_table() {
        let cases = [
            (Some("EMAIL_EXISTS"), "This email exists already"),
            (Some("EMAIL_NOT_FOUND"), "This email does not exist."),
            (Some("INVALID_PASSWORD"), "This password is not correct."),
            (Some("TOO_MANY_ATTEMPTS_TRY_LATER"), "An unknown error occurred!"),
            (None, "An unknown error occurred!"),
        ];
        for (code, message) in cases {
            assert_eq!(AuthFailure::from_code(code).message(), message, "code {code:?}");
            assert_eq!(AuthFailure::classify(&rejected(code, 400)).message(), message);
        }
    }

    #[test]
    fn test_malformed_auth_response_is_unknown() {
        let error = RemoteError::Malformed("bad".to_string());
        assert_eq!(AuthFailure::classify(&error), AuthFailure::Unknown);
    }

    #[test]
    fn test_collection_classification() {
        assert_eq!(
            CollectionFailure::classify(&rejected(None, 401)),
            CollectionFailure::Unauthorized
        );
        assert_eq!(
            CollectionFailure::classify(&rejected(None, 500)),
            CollectionFailure::Rejected(500)
        );
        assert_eq!(
            CollectionFailure::classify(&RemoteError::Malformed("x".to_string())),
            CollectionFailure::Malformed
        );
        assert!(CollectionFailure::Rejected(500).message().contains("500"));
    }
}
