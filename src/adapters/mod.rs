// Adapters layer: concrete implementations of the domain ports.

pub mod gemini;
pub mod http_images;
pub mod storage;
