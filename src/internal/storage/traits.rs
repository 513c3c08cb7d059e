pub mod storage_adapter;

pub use storage_adapter::{FileHandle, StorageAdapter};
