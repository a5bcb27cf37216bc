//! Output formatting for scan results.

use anyhow::Result;
use rawscan_common::ScanOutcome;

/// Print scan results in the requested format, preserving the order
/// the engine produced them in (TCP before UDP, IPv4 before IPv6).
pub fn print_results(results: &[ScanOutcome], format: &str) -> Result<()> {
    match format.trim().to_lowercase().as_str() {
        "json" => print_json(results),
        "text" | "" => {
            print_text(results);
            Ok(())
        }
        other => {
            eprintln!("Warning: unknown format '{other}', using text");
            print_text(results);
            Ok(())
        }
    }
}

fn print_text(results: &[ScanOutcome]) {
    for outcome in results {
        println!("{outcome}");
    }
}

fn print_json(results: &[ScanOutcome]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawscan_common::{Protocol, ScanVerdict};

    fn sample() -> Vec<ScanOutcome> {
        vec![ScanOutcome {
            target_ip: "127.0.0.1".to_string(),
            port: 22,
            protocol: Protocol::Tcp,
            verdict: ScanVerdict::Open,
        }]
    }

    #[test]
    fn text_format_does_not_error() {
        assert!(print_results(&sample(), "text").is_ok());
    }

    #[test]
    fn json_format_does_not_error() {
        assert!(print_results(&sample(), "json").is_ok());
    }

    #[test]
    fn unknown_format_falls_back_to_text() {
        assert!(print_results(&sample(), "xml").is_ok());
    }
}
