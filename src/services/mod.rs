pub mod export;
pub mod failure_writer;
pub mod image_editor;
pub mod ingestion;

pub use export::{download_all, download_one};
pub use failure_writer::FailureWriter;
pub use image_editor::ImageEditor;
pub use ingestion::{ingest_into, prepare_batch, IngestReport, IngestSummary};
