pub mod functions;
pub mod structs;
