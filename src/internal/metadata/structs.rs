pub mod download_metadata;
pub mod metadata_error;

pub use download_metadata::DownloadMetadata;
pub use metadata_error::MetadataError;
