pub mod analysis;
pub mod client;
pub mod generation;
pub mod image;

pub use client::{GeminiClient, GeminiSettings};
pub use image::ImagePayload;
