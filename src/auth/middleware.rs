//! Authorization Gate
//! Mission: Validate bearer tokens and attach claims to the request

use crate::auth::tokens::{AuthError, Reason, TokenKeys};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pull the bearer token out of the Authorization header. Missing or
/// malformed headers yield the empty string.
pub fn bearer_token(req: &Request) -> &str {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// Auth middleware that validates access tokens and stores the claims in
/// request extensions for downstream handlers.
pub async fn auth_middleware(
    State(keys): State<Arc<TokenKeys>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&req);
    if token.is_empty() {
        return Err(AuthError::Unauthenticated(Reason::NoToken));
    }

    let claims = keys.validate_access(token)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/voter/status");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let req = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_yields_empty_token() {
        let req = request_with_auth(None);
        assert_eq!(bearer_token(&req), "");
    }

    #[test]
    fn test_malformed_header_yields_empty_token() {
        // No "Bearer " prefix
        let req = request_with_auth(Some("Token abc"));
        assert_eq!(bearer_token(&req), "");

        // Wrong case is treated as malformed
        let req = request_with_auth(Some("bearer abc"));
        assert_eq!(bearer_token(&req), "");
    }
}
