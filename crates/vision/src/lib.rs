pub mod client;
pub mod threshold;
pub mod types;

pub use client::{VisionClient, VisionConfig};
pub use threshold::{LabelThreshold, DEFAULT_LABEL_THRESHOLD};
