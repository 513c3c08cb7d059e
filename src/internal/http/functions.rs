pub mod block_fetcher;
pub mod cache_buster;
pub mod server_probe;

pub use block_fetcher::{range_header, BlockFetcher};
pub use cache_buster::{cache_busted_url, CACHE_BUSTER_PARAM};
pub use server_probe::{declares_byte_ranges, parse_file_size, ServerProbe, MAX_FILE_SIZE, PROBE_RANGE};
