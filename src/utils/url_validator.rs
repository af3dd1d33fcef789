//! Target URL validation.
//!
//! Targets are stored exactly as submitted; validation only decides whether
//! the string is an absolute http(s) URL with a host.

use url::Url;

/// Errors that can occur during URL validation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Longest target accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// Checks that `input` is a redirectable target.
///
/// Rejects `javascript:`, `data:`, `file:` and every other non-HTTP scheme.
///
/// # Errors
///
/// See [`UrlValidationError`].
pub fn validate_target_url(input: &str) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_target_url("http://example.com").is_ok());
        assert!(validate_target_url("https://example.com/path?q=rust#frag").is_ok());
        assert!(validate_target_url("http://192.168.1.1:8080/api").is_ok());
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for input in [
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "file:///etc/passwd",
            "ftp://example.com/file.txt",
            "mailto:test@example.com",
        ] {
            assert_eq!(
                validate_target_url(input),
                Err(UrlValidationError::UnsupportedProtocol),
                "{input}"
            );
        }
    }

    #[test]
    fn test_rejects_relative_and_garbage() {
        assert!(matches!(
            validate_target_url("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_target_url(""),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_overlong() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(validate_target_url(&url), Err(UrlValidationError::TooLong));
    }
}
