pub mod backend;
pub mod inference_client;

pub use backend::InferenceBackend;
pub use inference_client::InferenceClient;
