use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => handle.render(),
        None => "Metrics are disabled".to_string(),
    }
}

/// What the caller asked for, captured before the request is consumed.
struct RequestLine {
    method: String,
    path: String,
    route: Option<String>,
    user_agent: String,
}

impl RequestLine {
    fn capture(req: &Request) -> Self {
        Self {
            method: req.method().as_str().to_owned(),
            path: req.uri().path().to_owned(),
            route: req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched| matched.as_str().to_owned()),
            user_agent: req
                .headers()
                .get(header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown")
                .to_owned(),
        }
    }

    fn span(&self) -> Span {
        info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %self.method,
            path = %self.path,
            route = self.route.as_deref(),
            user_id = tracing::field::Empty,
        )
    }

    /// Route template used as the metric label.
    fn route_label(&self) -> String {
        self.route.clone().unwrap_or_else(|| "unmatched".to_owned())
    }
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

fn record_metrics(line: &RequestLine, status: StatusCode, started: Instant) {
    let labels = [
        ("method", line.method.clone()),
        ("route", line.route_label()),
        ("status", status.as_u16().to_string()),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let line = RequestLine::capture(&req);
    let span = line.span();

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        record_metrics(&line, status, started);

        if status.is_server_error() {
            warn!(
                event = "http_request_finished",
                duration_ms,
                status_code = status.as_u16(),
                user_agent = %line.user_agent,
                outcome = outcome(status),
                "Request failed"
            );
        } else {
            info!(
                event = "http_request_finished",
                duration_ms,
                status_code = status.as_u16(),
                user_agent = %line.user_agent,
                outcome = outcome(status),
                "Request finished"
            );
        }

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    for (name, value) in SECURITY_HEADERS {
        response
            .headers_mut()
            .insert(name, HeaderValue::from_static(value));
    }

    response
}
