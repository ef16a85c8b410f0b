mod error;
pub mod gemini;
#[cfg(feature = "render")]
mod render;

pub use error::{AnalyzeError, Result};
pub use gemini::{DEFAULT_MODEL, GeminiClient};
#[cfg(feature = "render")]
pub use render::render_pages_jpeg;
