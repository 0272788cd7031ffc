//! Periodic terminal rendering of the connection set.

use std::{io::Write, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

use crate::{domain::ConnectionSnapshot, infrastructure::registry::ConnectionRegistry};

const CLEAR_SCREEN: &str = "\x1B[H\x1B[2J";
const RULE: &str = "----------------------------------------------------------------";

/// Render the member table shown on stdout
pub fn render_status_table(snapshot: &[ConnectionSnapshot]) -> String {
    let mut out = String::new();
    out.push_str("Connected clients:\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "| {:<15} | {:<25} | {:<15} |\n",
        "Type", "Address", "Nickname"
    ));
    out.push_str(RULE);
    out.push('\n');
    for member in snapshot {
        out.push_str(&format!(
            "| {:<15} | {:<25} | {:<15} |\n",
            member.kind.label(),
            member.address,
            member.name
        ));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

fn redraw(table: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write!(stdout, "{}{}", CLEAR_SCREEN, table).and_then(|_| stdout.flush()) {
        tracing::debug!("Status display write failed: {}", e);
    }
}

/// Redraw the table every `interval` until `shutdown` fires
pub fn spawn_status_display(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let table = render_status_table(&registry.snapshot().await);
                    redraw(&table);
                }
            }
        }
    })
}
