use anyhow::{anyhow, Result};
use tracing::info;

use rawscan_common::ScanPlan;
use rawscan_net::{parse_ports, resolve_target};

use crate::args::Cli;

/// Turn parsed CLI arguments into a `ScanPlan`. Assumes
/// `cli.list_interfaces` is false and `cli.interface` is `Some` —
/// the list-interfaces short-circuit happens in `main` before this is
/// ever called.
pub fn build_plan(cli: &Cli) -> Result<ScanPlan> {
    let interface = cli
        .interface
        .clone()
        .ok_or_else(|| anyhow!("an interface is required (-i/--interface)"))?;

    let targets_raw = cli
        .targets
        .as_deref()
        .ok_or_else(|| anyhow!("at least one target is required (-t/--targets)"))?;

    if cli.tcp_ports.is_none() && cli.udp_ports.is_none() {
        return Err(anyhow!(
            "at least one of --tcp-ports or --udp-ports is required"
        ));
    }

    let mut plan = ScanPlan::new(interface);
    plan.timeout_ms = cli.timeout_ms;

    if let Some(spec) = &cli.tcp_ports {
        plan.tcp_ports = parse_ports(spec)?;
    }
    if let Some(spec) = &cli.udp_ports {
        plan.udp_ports = parse_ports(spec)?;
    }

    for host in targets_raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (v4, v6) = resolve_target(host)?;
        info!(host, v4 = v4.len(), v6 = v6.len(), "resolved target");
        plan.targets_v4.extend(v4);
        plan.targets_v6.extend(v6);
    }

    if plan.targets_v4.is_empty() && plan.targets_v6.is_empty() {
        return Err(anyhow!("no targets resolved to an address"));
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            interface: Some("eth0".to_string()),
            list_interfaces: false,
            targets: Some("127.0.0.1".to_string()),
            tcp_ports: Some("80".to_string()),
            udp_ports: None,
            timeout_ms: 5000,
            output_format: "text".to_string(),
            verbose: 0,
        }
    }

    #[test]
    fn rejects_missing_ports() {
        let mut cli = base_cli();
        cli.tcp_ports = None;
        assert!(build_plan(&cli).is_err());
    }

    #[test]
    fn rejects_missing_interface() {
        let mut cli = base_cli();
        cli.interface = None;
        assert!(build_plan(&cli).is_err());
    }

    #[test]
    fn builds_plan_for_ip_literal_target() {
        let cli = base_cli();
        let plan = build_plan(&cli).unwrap();
        assert_eq!(plan.tcp_ports, vec![80]);
        assert_eq!(plan.targets_v4.len(), 1);
        assert_eq!(plan.targets_v4[0].ip, "127.0.0.1");
    }
}
