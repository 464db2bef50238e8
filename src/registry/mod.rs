pub mod client;
pub mod transport;

pub use client::RegistryClient;
pub use transport::{RegistrySession, RegistryTransport, StaticRegistry};
