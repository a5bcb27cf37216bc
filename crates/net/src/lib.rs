//! Interface enumeration, DNS resolution, and port-spec parsing —
//! everything the CLI needs to turn user input into a `ScanPlan`.

pub mod dns;
pub mod interfaces;
pub mod ports;

pub use dns::resolve_target;
pub use interfaces::{find_interface_address, list_interfaces, InterfaceSummary};
pub use ports::parse_ports;
