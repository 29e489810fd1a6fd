// devlink-api: Async client for device-to-user associations over a generic data service

pub mod client;
pub mod device;
pub mod error;
pub mod filter;
pub mod models;
pub mod registry;
pub mod transport;

pub use client::DataClient;
pub use device::{DeviceManager, Removal};
pub use error::Error;
pub use registry::Registry;
pub use transport::{TlsMode, TransportConfig};
