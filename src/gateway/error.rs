/// Failures of a Search Gateway call.
///
/// The console never propagates these; each one ends up as a single error
/// entry in the scrollback carrying the `Display` text.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("Failed to fetch data from iTunes API (status {status})")]
    Upstream { status: u16 },

    /// The body was not a valid iTunes payload.
    #[error("Malformed response from iTunes API: {0}")]
    Decode(String),

    /// Anything else a gateway implementation wants to report verbatim.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Upstream {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message() {
        let err = GatewayError::Upstream { status: 503 };
        assert_eq!(
            err.to_string(),
            "Failed to fetch data from iTunes API (status 503)"
        );
    }

    #[test]
    fn test_decode_from_serde() {
        let err: GatewayError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, GatewayError::Decode(_)));
        assert!(err.to_string().starts_with("Malformed response"));
    }

    #[test]
    fn test_other_is_verbatim() {
        assert_eq!(GatewayError::Other("boom".into()).to_string(), "boom");
    }
}
