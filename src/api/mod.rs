mod client;
mod error;
mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, Body, HttpTransport, Method, Transport, API_PREFIX};
