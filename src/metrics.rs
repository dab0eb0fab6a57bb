use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use rollcall_models::{AttendanceStatus, LeaveStatus, Role};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::error;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )?
        .install_recorder()
}

/// Initialize the Prometheus recorder and its upkeep task.
/// Returns None if observability is disabled or the recorder cannot be installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = match install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder; metrics disabled");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for the metrics server
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Domain counters

pub fn track_user_created(role: Role) {
    if !is_observability_enabled() {
        return;
    }
    counter!("users_created_total", "role" => role.as_str()).increment(1);
}

pub fn track_user_login_success(role: Role) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => role.as_str(), "status" => "success").increment(1);
}

pub fn track_user_login_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => "unknown", "status" => "failure", "reason" => reason)
        .increment(1);
}

pub fn track_jwt_issued() {
    if !is_observability_enabled() {
        return;
    }
    counter!("jwt_tokens_issued_total").increment(1);
}

pub fn track_reset_code_sent() {
    if !is_observability_enabled() {
        return;
    }
    counter!("password_reset_codes_total").increment(1);
}

pub fn track_attendance_marked(status: AttendanceStatus) {
    if !is_observability_enabled() {
        return;
    }
    counter!("attendance_marked_total", "status" => format!("{:?}", status)).increment(1);
}

pub fn track_duplicate_mark() {
    if !is_observability_enabled() {
        return;
    }
    counter!("attendance_duplicate_marks_total").increment(1);
}

pub fn track_leave_applied() {
    if !is_observability_enabled() {
        return;
    }
    counter!("leaves_applied_total").increment(1);
}

pub fn track_leave_reviewed(status: LeaveStatus) {
    if !is_observability_enabled() {
        return;
    }
    counter!("leaves_reviewed_total", "status" => format!("{:?}", status)).increment(1);
}

pub fn track_leave_cancelled() {
    if !is_observability_enabled() {
        return;
    }
    counter!("leaves_cancelled_total").increment(1);
}

/// Denied policy checks, by caller role.
pub fn track_authorization_denied(role: Role) {
    if !is_observability_enabled() {
        return;
    }
    counter!("authorization_denials_total", "role" => role.as_str()).increment(1);
}
