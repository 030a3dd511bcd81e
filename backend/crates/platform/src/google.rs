//! Google ID-token verification
//!
//! Verifies Google Sign-In ID tokens against the tokeninfo endpoint.
//! The [`TokenVerifier`] trait is the injection seam; [`MockTokenVerifier`]
//! stands in for the network call in tests and development.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Google tokeninfo endpoint
const TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";

/// Accepted `iss` values for Google ID tokens
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims extracted from a verified Google ID token
#[derive(Debug, Clone)]
pub struct GoogleIdClaims {
    /// Subject - the opaque, stable Google account identifier
    pub sub: String,
    /// Verified email address
    pub email: String,
    /// Token issuer
    pub issuer: String,
    /// Audience (must equal the configured client id)
    pub audience: String,
    /// Expiry as Unix seconds
    pub expires_at: i64,
}

/// Error verifying a Google ID token
#[derive(Debug, thiserror::Error)]
pub enum GoogleVerifyError {
    #[error("token is required")]
    EmptyToken,
    #[error("tokeninfo request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token rejected by Google: {0}")]
    Rejected(String),
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),
    #[error("unexpected issuer: {0}")]
    WrongIssuer(String),
    #[error("audience does not match client id")]
    WrongAudience,
    #[error("token is expired")]
    Expired,
}

/// Capability for verifying upstream OAuth ID tokens
#[trait_variant::make(TokenVerifier: Send)]
pub trait LocalTokenVerifier {
    /// Verify an ID token and return its claims
    async fn verify(&self, id_token: &str) -> Result<GoogleIdClaims, GoogleVerifyError>;
}

// ============================================================================
// Live verifier (tokeninfo endpoint)
// ============================================================================

/// Raw tokeninfo response
///
/// The endpoint is inconsistent about numeric fields (string vs number),
/// so `exp` is deserialized leniently.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default, alias = "user_id")]
    sub: Option<String>,
    #[serde(default, alias = "audience")]
    aud: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    exp: Option<i64>,
}

fn de_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(i64),
        Str(String),
    }

    let value: Option<NumOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumOrString::Num(n)) => Some(n),
        Some(NumOrString::Str(s)) => s.parse().ok(),
        None => None,
    })
}

/// Verifier backed by the Google tokeninfo endpoint
#[derive(Debug, Clone)]
pub struct GoogleTokenVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
        }
    }
}

impl TokenVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdClaims, GoogleVerifyError> {
        if id_token.is_empty() {
            return Err(GoogleVerifyError::EmptyToken);
        }

        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("access_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleVerifyError::Rejected(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response.json().await?;
        let now = chrono::Utc::now().timestamp();
        validate_token_info(info, &self.client_id, now)
    }
}

/// Validate tokeninfo claims: issuer, audience, expiry
///
/// Pure so the rules are testable without the network round-trip.
fn validate_token_info(
    info: TokenInfo,
    client_id: &str,
    now: i64,
) -> Result<GoogleIdClaims, GoogleVerifyError> {
    let issuer = info.iss.ok_or(GoogleVerifyError::MissingClaim("iss"))?;
    if !GOOGLE_ISSUERS.contains(&issuer.as_str()) {
        return Err(GoogleVerifyError::WrongIssuer(issuer));
    }

    let audience = info.aud.ok_or(GoogleVerifyError::MissingClaim("aud"))?;
    if audience != client_id {
        return Err(GoogleVerifyError::WrongAudience);
    }

    let expires_at = info.exp.ok_or(GoogleVerifyError::MissingClaim("exp"))?;
    if expires_at <= now {
        return Err(GoogleVerifyError::Expired);
    }

    let sub = info.sub.ok_or(GoogleVerifyError::MissingClaim("sub"))?;
    let email = info.email.ok_or(GoogleVerifyError::MissingClaim("email"))?;

    Ok(GoogleIdClaims {
        sub,
        email,
        issuer,
        audience,
        expires_at,
    })
}

// ============================================================================
// Mock verifier (tests, development)
// ============================================================================

/// In-memory verifier accepting pre-registered tokens
#[derive(Debug, Default)]
pub struct MockTokenVerifier {
    tokens: Mutex<HashMap<String, GoogleIdClaims>>,
}

impl MockTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token the mock will accept
    pub fn register(&self, id_token: impl Into<String>, claims: GoogleIdClaims) {
        self.tokens
            .lock()
            .expect("mock verifier lock poisoned")
            .insert(id_token.into(), claims);
    }
}

impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdClaims, GoogleVerifyError> {
        if id_token.is_empty() {
            return Err(GoogleVerifyError::EmptyToken);
        }
        self.tokens
            .lock()
            .expect("mock verifier lock poisoned")
            .get(id_token)
            .cloned()
            .ok_or_else(|| GoogleVerifyError::Rejected("unknown mock token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        validate_token_info, GoogleIdClaims, GoogleVerifyError, MockTokenVerifier, TokenInfo,
        TokenVerifier, GOOGLE_ISSUERS,
    };

    fn info(iss: &str, aud: &str, exp: i64) -> TokenInfo {
        TokenInfo {
            iss: Some(iss.to_string()),
            sub: Some("sub-1".to_string()),
            aud: Some(aud.to_string()),
            email: Some("user@example.com".to_string()),
            exp: Some(exp),
        }
    }

    #[test]
    fn test_validate_accepts_both_issuers() {
        for iss in GOOGLE_ISSUERS {
            let claims = validate_token_info(info(iss, "client-1", 2_000), "client-1", 1_000)
                .expect("issuer should be accepted");
            assert_eq!(claims.sub, "sub-1");
            assert_eq!(claims.email, "user@example.com");
        }
    }

    #[test]
    fn test_validate_rejects_wrong_issuer() {
        let result = validate_token_info(
            info("evil.example.com", "client-1", 2_000),
            "client-1",
            1_000,
        );
        assert!(matches!(result, Err(GoogleVerifyError::WrongIssuer(_))));
    }

    #[test]
    fn test_validate_rejects_wrong_audience() {
        let result = validate_token_info(
            info("accounts.google.com", "other-client", 2_000),
            "client-1",
            1_000,
        );
        assert!(matches!(result, Err(GoogleVerifyError::WrongAudience)));
    }

    #[test]
    fn test_validate_rejects_expired() {
        let result = validate_token_info(
            info("accounts.google.com", "client-1", 999),
            "client-1",
            1_000,
        );
        assert!(matches!(result, Err(GoogleVerifyError::Expired)));
    }

    #[test]
    fn test_validate_rejects_missing_email() {
        let mut bad = info("accounts.google.com", "client-1", 2_000);
        bad.email = None;
        let result = validate_token_info(bad, "client-1", 1_000);
        assert!(matches!(result, Err(GoogleVerifyError::MissingClaim("email"))));
    }

    #[test]
    fn test_lenient_exp_parsing() {
        let json = r#"{"iss":"accounts.google.com","sub":"s","aud":"a","email":"e@x.io","exp":"1234"}"#;
        let parsed: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.exp, Some(1234));

        let json = r#"{"iss":"accounts.google.com","sub":"s","aud":"a","email":"e@x.io","exp":1234}"#;
        let parsed: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.exp, Some(1234));
    }

    #[tokio::test]
    async fn test_mock_verifier() {
        let mock = MockTokenVerifier::new();
        mock.register(
            "good-token",
            GoogleIdClaims {
                sub: "sub-9".to_string(),
                email: "biz@example.com".to_string(),
                issuer: "accounts.google.com".to_string(),
                audience: "client-1".to_string(),
                expires_at: i64::MAX,
            },
        );

        let claims = mock.verify("good-token").await.unwrap();
        assert_eq!(claims.sub, "sub-9");

        assert!(mock.verify("bad-token").await.is_err());
        assert!(matches!(
            mock.verify("").await,
            Err(GoogleVerifyError::EmptyToken)
        ));
    }
}
