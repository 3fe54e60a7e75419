// System Layer
pub mod archive;
pub mod host;
pub mod worker;

pub use host::HostShell;
pub use worker::ThreadedBackend;
