//! Rendering and output of the index page and data script

pub mod index;
pub mod templates;
pub mod writer;

pub use index::IndexPageRenderer;
pub use templates::{Templates, DATA_TEMPLATE, DEFAULT_TEMPLATE_DIR, INDEX_TEMPLATE};
pub use writer::{write_outputs, WrittenFiles};
