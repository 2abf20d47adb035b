//! Per-route timing and logging.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;

/// Wrap `route` so every call logs `action`, the response status and how
/// long the handler took.
pub fn timed<S>(action: &'static str, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(middleware::from_fn_with_state(action, log_timing))
}

async fn log_timing(State(action): State<&'static str>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(
        action,
        status = response.status().as_u16(),
        "{action} completed in {elapsed_ms:.2} ms"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn timed_route_passes_response_through() {
        let app: Router = Router::new().route(
            "/teapot",
            timed("brew", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") })),
        );
        let response = app
            .oneshot(HttpRequest::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"short and stout");
    }

    #[tokio::test]
    async fn timed_route_keeps_method_filtering() {
        let app: Router = Router::new().route("/only-get", timed("only_get", get(|| async { "ok" })));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/only-get")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
