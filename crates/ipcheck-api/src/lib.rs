//! # ipcheck-api
//!
//! HTTP submission service. `POST /submit-ip` looks the address up with the reputation
//! checker, publishes the resulting [`ScanResult`](ipcheck_core::ScanResult) and answers with
//! the verdict.

mod error;
mod handler;

use axum::routing::post;
use axum::Router;
use ipcheck_broker::Publish;
use ipcheck_client::ReputationCheck;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handler::{SubmitRequest, SubmitResponse};

/// Read-only collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    checker: Arc<dyn ReputationCheck>,
    publisher: Arc<dyn Publish>,
}

impl AppState {
    pub fn new(checker: Arc<dyn ReputationCheck>, publisher: Arc<dyn Publish>) -> Self {
        Self { checker, publisher }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submit-ip", post(handler::submit_ip))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
