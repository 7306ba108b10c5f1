//! # IPv4 Range Model
//!
//! A continuous, inclusive block of IPv4 addresses. The subnet enumerator
//! builds one of these from a CIDR block and walks it in ascending order.

use std::net::Ipv4Addr;

use pnet::ipnetwork::{IpNetworkError, Ipv4Network};

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses covered. Zero when `start_addr > end_addr`.
    pub fn len(&self) -> u64 {
        let start: u64 = u32::from(self.start_addr).into();
        let end: u64 = u32::from(self.end_addr).into();
        if start > end { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the first and last address of the range (network and broadcast).
    ///
    /// Ranges of two addresses or fewer are returned unchanged.
    pub fn without_edges(&self) -> Ipv4Range {
        if self.len() <= 2 {
            return *self;
        }
        let start: u32 = u32::from(self.start_addr) + 1;
        let end: u32 = u32::from(self.end_addr) - 1;
        Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end))
    }
}

/// Creates the range covering a whole network block (e.g. `192.168.1.0/24`).
///
/// Host bits set in `ip` are ignored.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, IpNetworkError> {
    let network = Ipv4Network::new(ip, prefix)?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
