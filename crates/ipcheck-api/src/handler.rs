//! `POST /submit-ip`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ipcheck_core::{ScanResult, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{ApiError, AppState};

/// Submission body
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub ip: String,
}

impl SubmitRequest {
    /// Build a request from a JSON object. The derived decoder alone would also take
    /// `["8.8.8.8"]` positionally, so the body is extracted as a map first.
    fn from_object(object: Map<String, Value>) -> Result<Self, ApiError> {
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            warn!(error = %e, "invalid request body");
            ApiError::InvalidRequest(e.to_string())
        })
    }
}

/// Successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub ip: String,
    pub status: Verdict,
}

pub(crate) async fn submit_ip(
    State(state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(object) = payload.map_err(|rejection| {
        let detail = rejection.body_text();
        warn!(error = %detail, "invalid request body");
        ApiError::InvalidRequest(detail)
    })?;
    let request = SubmitRequest::from_object(object)?;

    if request.ip.trim().is_empty() {
        warn!("empty ip in request body");
        return Err(ApiError::InvalidRequest("ip must not be empty".into()));
    }

    // Detached from the connection: a client hanging up does not abort the lookup or publish.
    let response = tokio::spawn(check_and_publish(state, request.ip))
        .await
        .map_err(|e| {
            error!(error = %e, "submission task failed");
            ApiError::Internal
        })??;

    Ok(Json(response))
}

async fn check_and_publish(state: AppState, ip: String) -> Result<SubmitResponse, ApiError> {
    let status = state.checker.check(&ip).await.map_err(|e| {
        error!(
            ip = %ip,
            error = %e,
            upstream = e.is_upstream(),
            status_code = e.status_code(),
            "reputation lookup failed"
        );
        ApiError::LookupFailed
    })?;

    let result = ScanResult::new(ip, status);

    state.publisher.publish(&result).await.map_err(|e| {
        error!(ip = %result.ip, error = %e, "failed to publish scan result");
        ApiError::PublishFailed
    })?;

    info!(ip = %result.ip, status = %status, "IP checked and published");

    Ok(SubmitResponse {
        ip: result.ip,
        status,
    })
}

#[cfg(test)]
mod tests {
    use crate::{router, AppState};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use ipcheck_broker::{BrokerError, BrokerResult, Delivery, Publish};
    use ipcheck_client::ReputationCheck;
    use ipcheck_core::{IpCheckError, Result, ScanResult, Verdict};
    use rdkafka::error::KafkaError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Answers with a fixed verdict, or a 403 from the API when `verdict` is `None`
    struct FakeChecker {
        verdict: Option<Verdict>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReputationCheck for FakeChecker {
        async fn check(&self, _ip: &str) -> Result<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict.ok_or_else(|| IpCheckError::Api {
                code: 403,
                message: "Forbidden".into(),
            })
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        fail: bool,
        published: Mutex<Vec<ScanResult>>,
    }

    #[async_trait]
    impl Publish for FakePublisher {
        async fn publish(&self, result: &ScanResult) -> BrokerResult<Delivery> {
            if self.fail {
                return Err(BrokerError::Kafka(KafkaError::Canceled));
            }
            let mut published = self.published.lock().unwrap();
            published.push(result.clone());
            Ok(Delivery {
                partition: 0,
                offset: i64::try_from(published.len()).unwrap() - 1,
            })
        }
    }

    struct Harness {
        checker: Arc<FakeChecker>,
        publisher: Arc<FakePublisher>,
    }

    impl Harness {
        fn new(verdict: Option<Verdict>, publish_fails: bool) -> Self {
            Self {
                checker: Arc::new(FakeChecker {
                    verdict,
                    calls: AtomicUsize::new(0),
                }),
                publisher: Arc::new(FakePublisher {
                    fail: publish_fails,
                    ..Default::default()
                }),
            }
        }

        async fn post(&self, body: &str) -> (StatusCode, serde_json::Value) {
            self.send(
                Request::post("/submit-ip")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
            let state = AppState::new(self.checker.clone(), self.publisher.clone());
            let response = router(state).oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            (status, body)
        }

        fn lookups(&self) -> usize {
            self.checker.calls.load(Ordering::SeqCst)
        }

        fn published(&self) -> Vec<ScanResult> {
            self.publisher.published.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_clean_submission_publishes_once() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        let (status, body) = harness.post(r#"{"ip":"8.8.8.8"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"ip": "8.8.8.8", "status": "clean"}));

        let published = harness.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].ip, "8.8.8.8");
        assert_eq!(published[0].status, Verdict::Clean);
        assert_eq!(published[0].source, "ip-submission-service");
    }

    #[tokio::test]
    async fn test_malicious_verdict_is_returned() {
        let harness = Harness::new(Some(Verdict::Malicious), false);

        let (status, body) = harness.post(r#"{"ip":"185.220.101.1"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "malicious");
        assert_eq!(harness.published()[0].status, Verdict::Malicious);
    }

    #[tokio::test]
    async fn test_missing_ip_is_bad_request() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        let (status, body) = harness.post("{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(harness.lookups(), 0);
        assert!(harness.published().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_request() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        for body in [
            "not json",
            r#"{"ip": 42}"#,
            r#"["8.8.8.8"]"#,
            r#"[]"#,
            r#""8.8.8.8""#,
            "null",
            r#"{"ip":"   "}"#,
        ] {
            let (status, response) = harness.post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert!(response["error"].is_string());
        }

        assert_eq!(harness.lookups(), 0);
        assert!(harness.published().is_empty());
    }

    #[tokio::test]
    async fn test_array_body_is_rejected_before_lookup() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        let (status, body) = harness.post(r#"["8.8.8.8"]"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(harness.lookups(), 0);
        assert!(harness.published().is_empty());
    }

    #[tokio::test]
    async fn test_extra_fields_are_ignored() {
        let harness = Harness::new(Some(Verdict::Suspicious), false);

        let (status, body) = harness.post(r#"{"ip":"9.9.9.9","note":"x"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ip"], "9.9.9.9");
        assert_eq!(harness.published().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        let (status, _) = harness
            .send(
                Request::post("/submit-ip")
                    .body(Body::from(r#"{"ip":"8.8.8.8"}"#))
                    .unwrap(),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(harness.lookups(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_publish() {
        let harness = Harness::new(None, false);

        let (status, body) = harness.post(r#"{"ip":"8.8.8.8"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to check IP");
        assert_eq!(harness.lookups(), 1);
        assert!(harness.published().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_is_server_error() {
        let harness = Harness::new(Some(Verdict::Suspicious), true);

        let (status, body) = harness.post(r#"{"ip":"8.8.8.8"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to publish scan result");
        assert_eq!(harness.lookups(), 1);
    }

    #[tokio::test]
    async fn test_repeat_submissions_are_not_deduplicated() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        harness.post(r#"{"ip":"1.1.1.1"}"#).await;
        harness.post(r#"{"ip":"1.1.1.1"}"#).await;

        assert_eq!(harness.lookups(), 2);
        assert_eq!(harness.published().len(), 2);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let harness = Harness::new(Some(Verdict::Clean), false);

        let (status, _) = harness
            .send(Request::get("/submit-ip").body(Body::empty()).unwrap())
            .await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(harness.lookups(), 0);
    }
}
