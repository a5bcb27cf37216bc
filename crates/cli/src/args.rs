use clap::Parser;

#[derive(Parser)]
#[command(name = "rawscan")]
#[command(version = "0.1.0")]
#[command(about = "Raw-socket TCP/UDP port scanner", long_about = None)]
pub struct Cli {
    /// Network interface to scan from (required unless --list-interfaces is given)
    #[arg(short = 'i', long)]
    pub interface: Option<String>,

    /// Print every interface and its addresses, then exit
    #[arg(long)]
    pub list_interfaces: bool,

    /// Targets: comma-separated IPs or hostnames
    #[arg(short = 't', long)]
    pub targets: Option<String>,

    /// TCP ports to scan. Examples: 80,443 or 1-1024 or 22,80-90
    #[arg(long = "tcp-ports")]
    pub tcp_ports: Option<String>,

    /// UDP ports to scan, same syntax as --tcp-ports
    #[arg(long = "udp-ports")]
    pub udp_ports: Option<String>,

    /// Per-probe timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub output_format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}
