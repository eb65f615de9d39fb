//! Concrete key-store backends

pub mod remote;
pub mod software;

pub use remote::{RemoteCryptoProvider, SigningRequest, SigningTransport};
pub use software::SoftwareKeyStore;
