//! # Subnet Enumeration
//!
//! Turns a CIDR string such as `192.168.1.0/24` into the ordered list of
//! addresses a sweep probes.
//!
//! Only the last octet may vary: the occupancy matrix has 256 cells, so a
//! prefix shorter than `/24` is rejected. Network (`.0`) and broadcast
//! (`.255`) addresses are part of the sweep by default because they still
//! own a cell in the matrix; [`AddressPolicy::HostsOnly`] drops them.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;
use tracing::debug;

use crate::error::ScanError;
use crate::network::range::{self, Ipv4Range};

/// Shortest prefix the sweeper accepts.
pub const MIN_PREFIX: u8 = 24;

/// Which addresses of a block are probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressPolicy {
    /// Every address of the block, network and broadcast included.
    #[default]
    All,
    /// Skip network and broadcast addresses (blocks of /30 and larger).
    HostsOnly,
}

/// A validated IPv4 block of at most 256 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    network: Ipv4Network,
}

impl Subnet {
    pub fn network_addr(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn range(&self) -> Ipv4Range {
        Ipv4Range::new(self.network.network(), self.network.broadcast())
    }

    /// Addresses to probe under `policy`, ascending and without duplicates.
    pub fn addresses(&self, policy: AddressPolicy) -> Vec<Ipv4Addr> {
        let range: Ipv4Range = match policy {
            AddressPolicy::All => self.range(),
            AddressPolicy::HostsOnly => self.range().without_edges(),
        };
        range.iter().collect()
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.network.prefix())
    }
}

impl FromStr for Subnet {
    type Err = ScanError;

    /// Parses `a.b.c.d/prefix`; a bare address is read as `/32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input: &str = s.trim();
        let (ip_str, prefix_str) = input.split_once('/').unwrap_or((input, "32"));

        let ip = ip_str
            .parse::<Ipv4Addr>()
            .map_err(|e| ScanError::invalid_cidr(s, format!("invalid address '{ip_str}': {e}")))?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| ScanError::invalid_cidr(s, format!("invalid prefix '{prefix_str}': {e}")))?;

        if prefix > 32 {
            return Err(ScanError::invalid_cidr(s, format!("prefix /{prefix} exceeds /32")));
        }
        if prefix < MIN_PREFIX {
            return Err(ScanError::invalid_cidr(
                s,
                format!("prefix /{prefix} spans more than 256 addresses, use /{MIN_PREFIX} or longer"),
            ));
        }

        let block: Ipv4Range =
            range::cidr_range(ip, prefix).map_err(|e| ScanError::invalid_cidr(s, e.to_string()))?;
        if block.start_addr != ip {
            debug!("{ip}/{prefix} has host bits set, sweeping {}/{prefix}", block.start_addr);
        }

        let network = Ipv4Network::new(block.start_addr, prefix)
            .map_err(|e| ScanError::invalid_cidr(s, e.to_string()))?;
        Ok(Subnet { network })
    }
}

/// Expands `cidr` into the ordered addresses to probe.
pub fn enumerate(cidr: &str, policy: AddressPolicy) -> Result<Vec<Ipv4Addr>, ScanError> {
    let subnet: Subnet = cidr.parse()?;
    Ok(subnet.addresses(policy))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
