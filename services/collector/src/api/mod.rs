use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use event_filter::EventFilter;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{config::CollectorConfig, recorder::BatchRecorder};

mod handlers;
mod types;

pub use handlers::{health_check, record_batch, source_config, transform, transform_source};
pub use types::{BatchResponse, ErrorResponse, TransformRequest, TransformResponse};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub struct ApiState {
    pub config: Arc<CollectorConfig>,
    pub recorder: Arc<BatchRecorder>,
    pub filter: Option<Arc<EventFilter>>,
}

impl ApiState {
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let filter = config.build_filter()?.map(Arc::new);
        let recorder = Arc::new(BatchRecorder::new(config.batch_output_file.clone()));

        Ok(Self {
            config: Arc::new(config),
            recorder,
            filter,
        })
    }
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/batch", post(record_batch))
        .route("/submit/v1/batch", post(record_batch))
        .route("/sourceConfig", get(source_config))
        .route("/denylist", get(transform_source))
        .route("/v1/transform", post(transform))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(middleware::from_fn(set_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn set_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(request_id.clone());

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), header_value);
    }

    let mut response = next.run(request).await;

    if !response.headers().contains_key(&REQUEST_ID_HEADER) {
        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), header_value);
        }
    }

    response
}
