// PDF rendering: fixed resume sections → wrapped lines → lopdf document.
// Nothing here touches the network or the database.

pub mod font_metrics;
pub mod handlers;
pub mod layout;
pub mod pdf;
pub mod resume;

use thiserror::Error;

pub use resume::{render_resume_pdf, RenderOptions};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error while writing PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
