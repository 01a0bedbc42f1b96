pub mod capture_source;
pub mod container_encoder;
pub mod recorder;
pub mod recorder_delegate;
pub mod sink;
