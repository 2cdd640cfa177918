//! Middleware de logging estructurado.
//!
//! Cada request corre dentro de un span `http_request`; al terminar se
//! registra el status, la duracion y la capa que sirvio el bootstrap.

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{Instrument, Span, field, info, info_span, warn};

use super::request_id::REQUEST_ID_HEADER;
use crate::handlers::response::CACHE_HEADER;

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

#[derive(Clone, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        provenance = field::Empty,
    )
}

/// Nivel de log segun status y capa.
fn log_completion(status: StatusCode, elapsed_ms: u64, provenance: Option<&str>) {
    let stale = provenance.is_some_and(|p| p.ends_with("-STALE"));

    if status.is_server_error() {
        warn!(status = status.as_u16(), elapsed_ms, "Request failed");
    } else if stale {
        warn!(status = status.as_u16(), elapsed_ms, "Request served stale data");
    } else {
        info!(status = status.as_u16(), elapsed_ms, "Request completed");
    }
}

impl<S> Service<Request<Body>> for LoggingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let span = request_span(&request);
        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                let response = inner.call(request).await?;

                let provenance = response
                    .headers()
                    .get(&CACHE_HEADER)
                    .and_then(|v| v.to_str().ok());
                if let Some(p) = provenance {
                    Span::current().record("provenance", p);
                }
                log_completion(
                    response.status(),
                    started.elapsed().as_millis() as u64,
                    provenance,
                );

                Ok(response)
            }
            .instrument(span),
        )
    }
}
