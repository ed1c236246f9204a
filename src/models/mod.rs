pub mod analysis;
pub mod batch;
pub mod loaders;
pub mod upload;

pub use analysis::{AnalysisResult, Prediction, VolumePair};
pub use batch::{BatchProgress, BatchReport, BatchResult, BatchSummary, ItemFailure};
pub use loaders::{load_scan, load_scan_folder};
pub use upload::UploadItem;
