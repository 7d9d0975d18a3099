use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a credential can fail to be minted or checked.
///
/// Nothing is retried internally; each variant reaches the caller on first
/// occurrence. Messages never contain secrets or token material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no secret provided")]
    EmptySecret,

    #[error("secret must be at least {min} bytes")]
    WeakSecret { min: usize },

    #[error("no token provided")]
    EmptyToken,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token lifetime must be at least one second")]
    InvalidExpiry,

    #[error("token is malformed: {0}")]
    MalformedToken(String),

    #[error("empty authorization code")]
    EmptyCode,

    #[error("empty auth state")]
    EmptyState,

    #[error("auth state does not match")]
    StateMismatch,

    #[error("signing key `{kid}` not found")]
    KeyNotFound { kid: String },

    #[error("issuer is invalid")]
    IssuerInvalid,

    #[error("audience is invalid")]
    AudienceInvalid,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl Error {
    pub(crate) fn network(e: impl std::fmt::Display) -> Self {
        Self::NetworkError(e.to_string())
    }

    pub(crate) fn malformed_response(e: impl std::fmt::Display) -> Self {
        Self::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_secret_mentions_minimum() {
        let err = Error::WeakSecret { min: 32 };
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn key_not_found_mentions_kid() {
        let err = Error::KeyNotFound {
            kid: "abc".to_owned(),
        };
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn network_helper_keeps_message() {
        let err = Error::network("connection refused");
        assert_eq!(err, Error::NetworkError("connection refused".to_owned()));
    }
}
