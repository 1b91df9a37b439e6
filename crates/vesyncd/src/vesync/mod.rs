mod client;
mod device;
mod error;
mod request;

pub use client::HttpVesyncClient;
#[cfg(test)]
pub(crate) use client::MockVesyncClient;
pub use client::VesyncClient;
#[cfg(test)]
pub(crate) use device::testutil;
pub use device::Category;
pub use device::Device;
pub use error::VesyncError;
pub use request::VendorCall;
pub use request::VendorRequest;
