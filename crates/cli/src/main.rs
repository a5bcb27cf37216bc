mod args;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use args::Cli;
use output::print_results;
use runner::build_plan;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_interfaces || cli.interface.is_none() {
        for iface in rawscan_net::list_interfaces() {
            println!("{}", iface.name);
            for addr in &iface.addresses {
                println!("  {:?} {}", addr.version, addr.ip);
            }
        }
        return Ok(());
    }

    let plan = build_plan(&cli)?;
    let results = rawscan_engine::run_scan(&plan)?;
    print_results(&results, &cli.output_format)?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).compact().init();
}
