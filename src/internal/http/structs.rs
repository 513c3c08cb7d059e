pub mod network_error;
pub mod probe_result;
pub mod reqwest_transport;
pub mod transport_response;

pub use network_error::NetworkError;
pub use probe_result::ProbeResult;
pub use reqwest_transport::ReqwestTransport;
pub use transport_response::TransportResponse;
