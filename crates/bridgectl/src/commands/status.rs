//! Status command handler.

use std::fmt::Write as _;

use tabled::Tabled;

use bridgectl_core::{Console, StatusSnapshot};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "RX")]
    rx: u64,
    #[tabled(rename = "TX")]
    tx: u64,
}

fn traffic_rows(s: &StatusSnapshot) -> Vec<TrafficRow> {
    s.role_names
        .iter()
        .zip(s.traffic.iter())
        .enumerate()
        .filter(|(_, (role, _))| !role.is_empty())
        .map(|(i, (role, t))| TrafficRow {
            slot: format!("D{}", i + 1),
            role: role.clone(),
            rx: t.rx,
            tx: t.tx,
        })
        .collect()
}

fn detail(s: &StatusSnapshot, paint: Painter) -> String {
    let wifi = if s.wifi.connected {
        let temp = if s.wifi.temporary { " (temporary)" } else { "" };
        paint.good(&format!(
            "{} {} {}%{temp}",
            s.wifi.ssid, s.wifi.ip_address, s.wifi.rssi_percent
        ))
    } else if s.wifi.ssid.is_empty() {
        paint.dim("access point")
    } else {
        paint.warn(&format!("connecting to {}", s.wifi.ssid))
    };

    let mut out = [
        format!("Device:    {}", s.device_name),
        format!("Firmware:  {}", s.version),
        format!("Uptime:    {}", s.uptime_display()),
        format!("Free RAM:  {} bytes", s.free_ram),
        format!("WiFi:      {wifi}"),
        format!("UART:      {} flow={}", s.uart_config, s.flow_control),
        format!("USB:       {}", s.usb_mode),
        format!("Bluetooth: {}", if s.bt_connected { "connected" } else { "-" }),
        format!(
            "Activity:  {}",
            if s.last_activity.is_empty() { "-" } else { &s.last_activity }
        ),
    ]
    .join("\n");

    let rows = traffic_rows(s);
    if !rows.is_empty() {
        let _ = write!(out, "\n\n{}", output::render_table(&rows));
    }
    if s.device4_packets.rx > 0 || s.device4_packets.tx > 0 {
        let _ = write!(
            out,
            "\nD4 packets: rx {} / tx {}",
            s.device4_packets.rx, s.device4_packets.tx
        );
    }
    out
}

fn render(s: &StatusSnapshot, global: &GlobalOpts) -> Result<String, CliError> {
    let paint = Painter::new(&global.color);
    output::render_single(
        &global.output,
        s,
        |s| detail(s, paint),
        StatusSnapshot::uptime_display,
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.watch {
        let snapshot = console.status().await?;
        output::print_output(&render(&snapshot, global)?, global.quiet);
        return Ok(());
    }

    let mut rx = console.start_status_poller().await;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = rx.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    output::print_output(&render(&snapshot, global)?, global.quiet);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    console.stop_status_poller().await;
    Ok(())
}
