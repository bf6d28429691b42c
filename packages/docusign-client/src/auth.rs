//! JWT grant authentication and the token lifecycle.
//!
//! DocuSign issues short-lived bearer tokens in exchange for an RS256-signed
//! assertion. Tokens are cached with their expiry and refreshed proactively;
//! a 401 from the API still triggers one re-authentication and one retry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{DocusignError, Result};
use crate::types::TokenResponse;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh this long before the provider-reported expiry.
const REFRESH_SKEW_SECS: i64 = 60;

/// Settings for the JWT grant flow.
#[derive(Debug, Clone)]
pub struct JwtGrantConfig {
    /// OAuth client id of the integration (assertion issuer).
    pub integration_key: String,
    /// API user being impersonated (assertion subject).
    pub user_id: String,
    /// OAuth host, e.g. `account-d.docusign.com` (assertion audience).
    pub oauth_host: String,
    /// RSA private key in PEM format.
    pub private_key_pem: String,
    pub assertion_lifetime: Duration,
}

/// Claims of the signed grant assertion.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtGrantConfig {
    pub fn claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.integration_key.clone(),
            sub: self.user_id.clone(),
            aud: self.oauth_host.clone(),
            scope: "signature impersonation".to_string(),
            iat,
            exp: iat + self.assertion_lifetime.as_secs() as i64,
        }
    }
}

/// A bearer token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - chrono::Duration::seconds(REFRESH_SKEW_SECS) > now
    }
}

/// Anything that can hand out bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current token, acquiring one if none is cached or it is about to expire.
    async fn access_token(&self) -> Result<String>;

    /// Drop any cached token and acquire a new one.
    async fn refresh(&self) -> Result<String>;
}

/// Run `action` with a bearer token, re-authenticating once on 401.
///
/// Any error other than `Unauthorized` propagates immediately. A second 401
/// propagates as well; there is never a third attempt.
pub async fn authenticated_call<S, T, F, Fut>(tokens: &S, action: F) -> Result<T>
where
    S: TokenSource + ?Sized,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let token = tokens.access_token().await?;
    match action(token).await {
        Err(e) if e.is_unauthorized() => {
            warn!(error = %e, "DocuSign token rejected, re-authenticating");
            let token = tokens.refresh().await?;
            action(token).await
        }
        other => other,
    }
}

/// Token cache backed by the DocuSign OAuth JWT grant.
///
/// Concurrent callers that all find the cache stale will each refresh. The
/// exchange is idempotent so the last writer wins.
pub struct JwtTokenManager {
    http_client: Client,
    config: JwtGrantConfig,
    encoding_key: EncodingKey,
    token_url: String,
    cached: RwLock<Option<CachedToken>>,
}

impl JwtTokenManager {
    pub fn new(http_client: Client, config: JwtGrantConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())?;
        let token_url = format!("https://{}/oauth/token", config.oauth_host);
        Ok(Self {
            http_client,
            config,
            encoding_key,
            token_url,
            cached: RwLock::new(None),
        })
    }

    /// Exchange assertions somewhere other than `https://{oauth_host}/oauth/token`.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Build and sign the grant assertion.
    pub fn build_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = self.config.claims(now);
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Exchange a fresh assertion for a bearer token.
    pub async fn get_access_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.build_assertion(now)?;

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "DocuSign token exchange failed");
            return Err(DocusignError::from_status(status, body));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "Acquired DocuSign access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        })
    }

    async fn store(&self, token: CachedToken) -> String {
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);
        access_token
    }
}

#[async_trait]
impl TokenSource for JwtTokenManager {
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.get_access_token().await?;
        Ok(self.store(token).await)
    }

    async fn refresh(&self) -> Result<String> {
        self.cached.write().await.take();
        let token = self.get_access_token().await?;
        Ok(self.store(token).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out `token-N`, where N counts refreshes.
    struct CountingTokens {
        refreshes: AtomicUsize,
    }

    impl CountingTokens {
        fn new() -> Self {
            Self {
                refreshes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenSource for CountingTokens {
        async fn access_token(&self) -> Result<String> {
            Ok(format!("token-{}", self.refreshes.load(Ordering::SeqCst)))
        }

        async fn refresh(&self) -> Result<String> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("token-{}", n))
        }
    }

    #[tokio::test]
    async fn retries_once_after_unauthorized() {
        let tokens = CountingTokens::new();
        let attempts = AtomicUsize::new(0);

        let result = authenticated_call(&tokens, |token| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(DocusignError::Unauthorized("expired".into()))
                } else {
                    Ok(format!("ok with {}", token))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "ok with token-1");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_unauthorized_propagates_without_third_attempt() {
        let tokens = CountingTokens::new();
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = authenticated_call(&tokens, |_token| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(DocusignError::Unauthorized("still expired".into())) }
        })
        .await;

        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let tokens = CountingTokens::new();
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = authenticated_call(&tokens, |_token| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(DocusignError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(DocusignError::Api { status: 500, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn claims_use_configured_lifetime() {
        let config = JwtGrantConfig {
            integration_key: "integration".into(),
            user_id: "api-user".into(),
            oauth_host: "account-d.docusign.com".into(),
            private_key_pem: String::new(),
            assertion_lifetime: Duration::from_secs(3600),
        };
        let now = Utc::now();

        let claims = config.claims(now);

        assert_eq!(claims.iss, "integration");
        assert_eq!(claims.sub, "api-user");
        assert_eq!(claims.aud, "account-d.docusign.com");
        assert_eq!(claims.scope, "signature impersonation");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    // =========================================================================
    // JwtTokenManager
    // =========================================================================

    const PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_rsa_private.pem");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/test_rsa_public.pem");

    fn grant_config() -> JwtGrantConfig {
        JwtGrantConfig {
            integration_key: "integration".into(),
            user_id: "api-user".into(),
            oauth_host: "account-d.docusign.com".into(),
            private_key_pem: PRIVATE_KEY.into(),
            assertion_lifetime: Duration::from_secs(3600),
        }
    }

    #[test]
    fn assertion_is_rs256_signed_with_grant_claims() {
        use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

        let manager = JwtTokenManager::new(Client::new(), grant_config()).unwrap();
        let assertion = manager.build_assertion(Utc::now()).unwrap();

        assert_eq!(decode_header(&assertion).unwrap().alg, Algorithm::RS256);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["account-d.docusign.com"]);
        let decoded = decode::<serde_json::Value>(
            &assertion,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        let claims = decoded.claims;
        assert_eq!(claims["iss"], "integration");
        assert_eq!(claims["sub"], "api-user");
        assert_eq!(claims["aud"], "account-d.docusign.com");
        assert_eq!(claims["scope"], "signature impersonation");
        assert_eq!(
            claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
            3600
        );
    }

    #[test]
    fn invalid_private_key_is_a_config_error() {
        let mut config = grant_config();
        config.private_key_pem = "not a key".into();

        let result = JwtTokenManager::new(Client::new(), config);

        assert!(matches!(result, Err(DocusignError::Config(_))));
    }

    /// Local token endpoint handing out `t1`, `t2`, ... one per exchange.
    async fn spawn_token_endpoint() -> (String, std::sync::Arc<AtomicUsize>) {
        use axum::routing::post;
        use axum::{Form, Json, Router};
        use std::collections::HashMap;

        let hits = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/oauth/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let counter = counter.clone();
                async move {
                    assert_eq!(form["grant_type"], JWT_BEARER_GRANT);
                    assert!(!form["assertion"].is_empty());
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(serde_json::json!({
                        "access_token": format!("t{}", n),
                        "token_type": "Bearer",
                        "expires_in": 3600
                    }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/oauth/token", addr), hits)
    }

    #[tokio::test]
    async fn fresh_token_is_reused_from_cache() {
        let (url, hits) = spawn_token_endpoint().await;
        let manager = JwtTokenManager::new(Client::new(), grant_config())
            .unwrap()
            .with_token_url(url);

        let first = manager.access_token().await.unwrap();
        let second = manager.access_token().await.unwrap();

        assert_eq!(first, "t1");
        assert_eq!(second, "t1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_cached_token() {
        let (url, hits) = spawn_token_endpoint().await;
        let manager = JwtTokenManager::new(Client::new(), grant_config())
            .unwrap()
            .with_token_url(url);

        assert_eq!(manager.access_token().await.unwrap(), "t1");
        assert_eq!(manager.refresh().await.unwrap(), "t2");
        assert_eq!(manager.access_token().await.unwrap(), "t2");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejected_exchange_is_not_cached() {
        use axum::http::StatusCode;
        use axum::routing::post;
        use axum::Router;

        let app = Router::new().route(
            "/oauth/token",
            post(|| async { (StatusCode::BAD_REQUEST, "consent_required") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let manager = JwtTokenManager::new(Client::new(), grant_config())
            .unwrap()
            .with_token_url(format!("http://{}/oauth/token", addr));

        let err = manager.access_token().await.unwrap_err();

        assert!(matches!(err, DocusignError::Api { status: 400, .. }));
        assert!(manager.cached.read().await.is_none());
    }

    #[test]
    fn token_is_stale_inside_refresh_window() {
        let now = Utc::now();
        let fresh = CachedToken {
            access_token: "a".into(),
            expires_at: now + chrono::Duration::minutes(30),
        };
        let stale = CachedToken {
            access_token: "b".into(),
            expires_at: now + chrono::Duration::seconds(30),
        };

        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }
}
