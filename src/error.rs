//! Error taxonomy for the export pipeline
//!
//! Nothing in this crate is fatal to the process. Malformed payloads never
//! error at all (the normalizer is total); the variants here cover the
//! export side, and each is contained to the operation that raised it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is still in flight; both would write to the same
    /// artifact naming scheme, so concurrent invocations are rejected.
    #[error("an export is already in progress")]
    Busy,

    /// Scene rasterization failed. Recoverable: the PDF exporter renders a
    /// visible error notice instead of the snapshot and continues.
    #[error("failed to capture graph snapshot: {0}")]
    Snapshot(String),

    /// The output artifact could not be produced or saved. Aborts this one
    /// export; artifacts already written stay on disk.
    #[error("failed to write export artifact {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to assemble PDF document")]
    Pdf(#[from] lopdf::Error),

    /// In-memory serialization of an artifact failed (saving into the
    /// output buffer, not touching disk).
    #[error("failed to serialize report bytes")]
    Io(#[from] std::io::Error),

    #[error("failed to encode PNG image")]
    Png(#[from] image::ImageError),
}
