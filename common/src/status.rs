//! Per-address scan states.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// State of one address within a sweep.
///
/// Transitions are one-shot: `Unscanned -> Active` or `Unscanned -> Free`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScanStatus {
    #[default]
    Unscanned,
    /// The host answered within the timeout.
    Active,
    /// No answer within the timeout, or an explicit unreachable signal.
    Free,
}

impl ScanStatus {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable { ScanStatus::Active } else { ScanStatus::Free }
    }

    pub fn is_terminal(self) -> bool {
        self != ScanStatus::Unscanned
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanStatus::Unscanned => "unscanned",
            ScanStatus::Active => "active",
            ScanStatus::Free => "free",
        };
        f.write_str(label)
    }
}

/// Address to status mapping, kept in ascending address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    entries: BTreeMap<Ipv4Addr, ScanStatus>,
}

impl StatusTable {
    /// Creates a table with every address `Unscanned`.
    pub fn new<I>(addresses: I) -> Self
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let entries = addresses
            .into_iter()
            .map(|addr| (addr, ScanStatus::Unscanned))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, addr: Ipv4Addr) -> Option<ScanStatus> {
        self.entries.get(&addr).copied()
    }

    /// Records the terminal status of `addr`.
    ///
    /// Returns `false` without touching the table when the address is unknown,
    /// already terminal, or `status` is `Unscanned`.
    pub fn resolve(&mut self, addr: Ipv4Addr, status: ScanStatus) -> bool {
        if !status.is_terminal() {
            return false;
        }
        match self.entries.get_mut(&addr) {
            Some(slot) if *slot == ScanStatus::Unscanned => {
                *slot = status;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Addr, ScanStatus)> + '_ {
        self.entries.iter().map(|(addr, status)| (*addr, *status))
    }

    pub fn count(&self, status: ScanStatus) -> usize {
        self.entries.values().filter(|s| **s == status).count()
    }

    /// Number of addresses that reached a terminal status.
    pub fn scanned(&self) -> usize {
        self.entries.values().filter(|s| s.is_terminal()).count()
    }

    /// `Active` addresses in ascending order.
    pub fn active(&self) -> Vec<Ipv4Addr> {
        self.iter()
            .filter(|(_, status)| *status == ScanStatus::Active)
            .map(|(addr, _)| addr)
            .collect()
    }

    /// Report file body: one `Active` address per line, ascending, each line
    /// newline-terminated. Empty when nothing answered.
    pub fn report(&self) -> String {
        self.active().iter().map(|addr| format!("{addr}\n")).collect()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    #[test]
    fn new_table_is_unscanned() {
        let table = StatusTable::new((0..4).map(addr));
        assert_eq!(table.len(), 4);
        assert_eq!(table.count(ScanStatus::Unscanned), 4);
        assert_eq!(table.scanned(), 0);
    }

    #[test]
    fn resolve_is_one_shot() {
        let mut table = StatusTable::new((0..4).map(addr));

        assert!(table.resolve(addr(1), ScanStatus::Active));
        assert!(!table.resolve(addr(1), ScanStatus::Free));
        assert_eq!(table.get(addr(1)), Some(ScanStatus::Active));

        assert!(!table.resolve(addr(2), ScanStatus::Unscanned));
        assert!(!table.resolve(addr(9), ScanStatus::Free));
        assert_eq!(table.scanned(), 1);
    }

    #[test]
    fn active_is_sorted_ascending() {
        let mut table = StatusTable::new([addr(254), addr(3), addr(1), addr(7)]);
        table.resolve(addr(254), ScanStatus::Active);
        table.resolve(addr(7), ScanStatus::Free);
        table.resolve(addr(1), ScanStatus::Active);

        assert_eq!(table.active(), vec![addr(1), addr(254)]);
        assert_eq!(table.count(ScanStatus::Free), 1);
        assert_eq!(table.count(ScanStatus::Unscanned), 1);
    }

    #[test]
    fn report_lists_active_one_per_line() {
        let mut table = StatusTable::new([addr(254), addr(1), addr(7)]);
        assert_eq!(table.report(), "");

        table.resolve(addr(254), ScanStatus::Active);
        table.resolve(addr(7), ScanStatus::Free);
        table.resolve(addr(1), ScanStatus::Active);
        assert_eq!(table.report(), "10.0.0.1\n10.0.0.254\n");
    }

    #[test]
    fn status_labels() {
        assert_eq!(ScanStatus::from_reachable(true), ScanStatus::Active);
        assert_eq!(ScanStatus::from_reachable(false).to_string(), "free");
    }
}
