pub mod block_size;
pub mod inspect;
pub mod work_file_path;

pub use block_size::parse_block_size;
pub use inspect::{read_work_file_metadata, read_work_file_metadata_with};
pub use work_file_path::{final_file_path, has_work_suffix, work_file_path};
