pub mod scan_loader;

pub use scan_loader::{load_scan, load_scan_folder};
