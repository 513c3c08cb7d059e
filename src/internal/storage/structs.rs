pub mod tokio_storage;

pub use tokio_storage::{TokioFileHandle, TokioStorage};
