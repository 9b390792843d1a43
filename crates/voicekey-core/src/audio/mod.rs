mod blob;
pub(crate) mod capture;

pub use {blob::AudioBlob, capture::CaptureSession};
