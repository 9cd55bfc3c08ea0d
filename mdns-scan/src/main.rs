//! mdns-scan
//!
//! Listens for mDNS traffic on the local network and prints every message it
//! sees, together with where it came from.
//!
//! # Usage
//!
//! ```
//! cargo run --bin mdns-scan -- --list
//! cargo run --bin mdns-scan -- --interfaces eth0,wlan0 --timeout 30
//! ```

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;

use mdns_scan::{InterfaceSelection, ScanConfig, Scanner, ifaces};

#[derive(Parser)]
#[command(name = "mdns-scan")]
#[command(version = "0.1.0")]
#[command(about = "Passively capture and decode mDNS traffic", long_about = None)]
struct Cli {
    /// List the system network interfaces and exit
    #[arg(short, long)]
    list: bool,
    /// Stop after this many seconds, 0 runs until interrupted
    #[arg(short, long, default_value_t = 0)]
    timeout: u64,
    /// Comma separated interface names, or "all"
    #[arg(short, long, default_value_t = format!("all"))]
    interfaces: String,
    #[arg(long, default_value_t = format!("INFO"))]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%H:%M:%S.%6f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, log_level)
        .init();

    if cli.list {
        return list_interfaces();
    }

    let selection: InterfaceSelection = cli.interfaces.parse()?;
    let config = ScanConfig::default()
        .with_interfaces(selection)
        .with_timeout(Duration::from_secs(cli.timeout));
    let scanner = Scanner::new(config)?;

    let (stop_tx, stop_rx) = stop_channel()?;
    println!("Press Ctrl-C to stop");

    let summary = scanner
        .run(stop_rx, |event| {
            println!("{}", event.transport);
            println!("{}", event.message);
        })
        .await?;

    log::info!(
        "capture finished ({}): {} messages, ipv4 {:?}, ipv6 {:?}",
        summary.stop_reason,
        summary.events,
        summary.ipv4,
        summary.ipv6
    );
    drop(stop_tx);
    Ok(())
}

// stop_channel installs the Ctrl-C handler. The returned sender keeps the
// channel open for the whole run, so only a real interrupt stops it.
fn stop_channel() -> Result<(broadcast::Sender<()>, broadcast::Receiver<()>)> {
    let (stop_tx, stop_rx) = broadcast::channel::<()>(1);
    let handler_tx = stop_tx.clone();
    ctrlc::set_handler(move || {
        let _ = handler_tx.send(());
    })?;
    Ok((stop_tx, stop_rx))
}

fn list_interfaces() -> Result<()> {
    for iface in ifaces::ifaces()? {
        println!("{iface}");
        for addr in &iface.addrs {
            println!("    {addr}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_stop_channel() {
        let (stop_tx, mut stop_rx) = stop_channel().unwrap();
        assert_eq!(stop_rx.try_recv(), Err(TryRecvError::Empty));
        stop_tx.send(()).unwrap();
        assert_eq!(stop_rx.try_recv(), Ok(()));

        // a second handler cannot be installed; that is an error, not a
        // closed channel
        assert!(stop_channel().is_err());
    }
}
