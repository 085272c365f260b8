use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::{Result, ZendeskError};

/// API token authentication, the `{email}/token:{token}` Basic scheme.
#[derive(Debug, Clone)]
pub struct ApiTokenAuth {
    email: String,
    token: String,
}

impl ApiTokenAuth {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
        }
    }

    /// Base64 credential block carried in the Authorization header.
    pub fn credentials(&self) -> String {
        STANDARD.encode(format!("{}/token:{}", self.email, self.token))
    }

    /// Default headers installed on every request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut authorization = HeaderValue::from_str(&format!("Basic {}", self.credentials()))
            .map_err(|e| ZendeskError::ConfigError(format!("Invalid credentials: {}", e)))?;
        authorization.set_sensitive(true);

        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_encode_email_token_pair() {
        let auth = ApiTokenAuth::new("agent@example.com", "s3cret");
        // base64("agent@example.com/token:s3cret")
        assert_eq!(
            auth.credentials(),
            "YWdlbnRAZXhhbXBsZS5jb20vdG9rZW46czNjcmV0"
        );
    }

    #[test]
    fn headers_carry_basic_authorization() {
        let auth = ApiTokenAuth::new("agent@example.com", "s3cret");
        let headers = auth.headers().unwrap();

        let value = headers.get(AUTHORIZATION).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
