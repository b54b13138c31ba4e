pub mod api;
pub mod config;
pub mod recorder;
pub mod track_order;

pub use api::{create_router, ApiState, BatchResponse, ErrorResponse, TransformRequest, TransformResponse};
pub use config::CollectorConfig;
pub use recorder::{BatchRecorder, RecorderError};
pub use track_order::{check_track_file, check_track_order, OrderInconsistency, TrackReport};
