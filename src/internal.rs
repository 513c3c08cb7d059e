pub mod http;
pub mod metadata;
pub mod session;
pub mod states;
pub mod storage;
