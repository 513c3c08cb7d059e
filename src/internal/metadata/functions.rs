pub mod trailer_codec;

pub use trailer_codec::{
    decode_trailer, encode_trailer, MAX_URL_LEN, TRAILER_SIZE, TRAILER_VERSION,
};
