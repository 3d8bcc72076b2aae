//! REST clients upstream of the publish driver: blog search and text
//! generation. Thin request/response wrappers; the driver itself only ever
//! sees the resulting `(title, body)` article files.

mod gemini;
mod naver;

pub use gemini::GeminiClient;
pub use naver::{BlogPost, NaverSearchClient};
