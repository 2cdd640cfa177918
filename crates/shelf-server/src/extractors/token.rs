use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderName, header, request::Parts},
};
use serde::Deserialize;

/// Header alternativo para el token de refresh.
pub static REFRESH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-refresh-token");

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Token presentado por el cliente, si hay alguno.
///
/// Se busca en orden: `Authorization: Bearer`, `x-refresh-token`, `?token=`.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(pub Option<String>);

impl AdminToken {
    /// Compara contra el token esperado sin cortocircuitar en el primer byte distinto.
    pub fn matches(&self, expected: &str) -> bool {
        match &self.0 {
            Some(given) => constant_time_eq(given.as_bytes(), expected.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        let header_token = parts
            .headers
            .get(&REFRESH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);

        let query_token = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token);

        let token = bearer
            .or(header_token)
            .map(str::to_string)
            .or(query_token)
            .filter(|t| !t.is_empty());

        Ok(AdminToken(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> AdminToken {
        let (mut parts, _) = request.into_parts();
        AdminToken::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let token = extract(
            Request::builder()
                .uri("/api/cache/refresh")
                .header("authorization", "Bearer abc")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(token.0.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_refresh_token_header_and_query() {
        let token = extract(
            Request::builder()
                .uri("/api/cache/refresh")
                .header("x-refresh-token", "from-header")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(token.0.as_deref(), Some("from-header"));

        let token = extract(
            Request::builder()
                .uri("/api/cache/refresh?token=from-query")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(token.0.as_deref(), Some("from-query"));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let token = extract(Request::builder().uri("/").body(()).unwrap()).await;
        assert!(token.0.is_none());
        assert!(!token.matches("anything"));
    }

    #[test]
    fn test_matches() {
        let token = AdminToken(Some("s3cret".into()));
        assert!(token.matches("s3cret"));
        assert!(!token.matches("s3cre"));
        assert!(!token.matches("s3creT"));
    }
}
