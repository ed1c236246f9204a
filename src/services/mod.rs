pub mod normalizer;
pub mod report;
pub mod viewer;

pub use normalizer::normalize;
pub use report::{render_result, write_batch_report};
pub use viewer::{present, ExportViewer, StagedVolumes, ViewerMetadata, VolumeViewer};
