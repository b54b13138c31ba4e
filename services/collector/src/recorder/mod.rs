mod batch_file;
mod error;

pub use batch_file::{extract_event_names, format_batch, BatchRecorder};
pub use error::RecorderError;
