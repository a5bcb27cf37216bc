//! Shared types, error taxonomy, and checksum utility for the rawscan
//! port scanner ecosystem.

pub mod checksum;
pub mod error;
pub mod types;

pub use checksum::internet_checksum;
pub use error::ScanError;
pub use types::{
    IpVersion, NetworkAddress, Probe, Protocol, ScanOutcome, ScanPlan, ScanVerdict,
};
