pub mod sweep;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pingmap_common::config::{DEFAULT_TCP_PORT, DEFAULT_TIMEOUT_MS, DEFAULT_WORKERS, MAX_WORKERS};

#[derive(Parser)]
#[command(name = "pingmap")]
#[command(version, about = "Sweeps an IPv4 subnet and maps which addresses answer.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output (-q drops decorations, -qq prints results only)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Hide the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every address of a subnet
    #[command(alias = "s")]
    Sweep(SweepArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// Subnet to sweep, e.g. 192.168.1.0/24 (prefix /24 to /32)
    pub cidr: String,

    /// Number of probes in flight
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    pub workers: usize,

    /// Per-probe timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Write the active addresses to this file, one per line
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How reachability is tested
    #[arg(short, long, value_enum, default_value_t = ProbeMethod::Ping)]
    pub method: ProbeMethod,

    /// Port used by the tcp method
    #[arg(short, long, default_value_t = DEFAULT_TCP_PORT)]
    pub port: u16,

    /// Skip the network and broadcast addresses
    #[arg(long)]
    pub hosts_only: bool,

    /// Do not draw the occupancy matrix
    #[arg(long)]
    pub no_matrix: bool,

    /// Do not listen for `q` to cancel
    #[arg(long)]
    pub no_input: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// One ICMP echo through the system `ping`
    Ping,
    /// TCP handshake, a refused connection counts as up
    Tcp,
}

fn parse_workers(raw: &str) -> Result<usize, String> {
    let workers: usize = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if (1..=MAX_WORKERS).contains(&workers) {
        Ok(workers)
    } else {
        Err(format!("must be between 1 and {MAX_WORKERS}"))
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

    fn sweep_args(argv: &[&str]) -> SweepArgs {
        let cli = CommandLine::try_parse_from(argv.iter().copied()).unwrap();
        match cli.command {
            Commands::Sweep(args) => args,
        }
    }

    #[test]
    fn defaults() {
        let args = sweep_args(&["pingmap", "sweep", "192.168.1.0/24"]);
        assert_eq!(args.cidr, "192.168.1.0/24");
        assert_eq!(args.workers, DEFAULT_WORKERS);
        assert_eq!(args.timeout, DEFAULT_TIMEOUT_MS);
        assert_eq!(args.method, ProbeMethod::Ping);
        assert_eq!(args.port, DEFAULT_TCP_PORT);
        assert!(args.output.is_none());
        assert!(!args.hosts_only);
    }

    #[test]
    fn alias_and_flags() {
        let cli = CommandLine::try_parse_from([
            "pingmap", "s", "10.0.0.0/28", "-w", "8", "-t", "250", "-m", "tcp", "-p", "22", "-o",
            "up.txt", "--hosts-only", "-qq",
        ])
        .unwrap();
        assert_eq!(cli.quiet, 2);

        let Commands::Sweep(args) = cli.command;
        assert_eq!(args.workers, 8);
        assert_eq!(args.timeout, 250);
        assert_eq!(args.method, ProbeMethod::Tcp);
        assert_eq!(args.port, 22);
        assert_eq!(args.output, Some(PathBuf::from("up.txt")));
        assert!(args.hosts_only);
    }

    #[test]
    fn worker_count_is_bounded() {
        assert!(CommandLine::try_parse_from(["pingmap", "sweep", "10.0.0.0/24", "-w", "0"]).is_err());
        assert!(CommandLine::try_parse_from(["pingmap", "sweep", "10.0.0.0/24", "-w", "257"]).is_err());
        assert!(CommandLine::try_parse_from(["pingmap", "sweep", "10.0.0.0/24", "-w", "256"]).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(CommandLine::try_parse_from(["pingmap", "sweep", "10.0.0.0/24", "-t", "0"]).is_err());
    }
}
