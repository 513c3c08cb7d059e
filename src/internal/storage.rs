pub mod structs;
pub mod traits;
