use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use stepd_status::logging::init_logging;
use stepd_status::stepd_client::format_relative_time;
use stepd_status::{Config, PollState, PollerConfig, PollerError, StatusPoller, StepdClient};

#[tokio::main]
async fn main() -> Result<(), PollerError> {
    init_logging();

    let config = Config::load().await;
    let client = StepdClient::new(&config)?;
    info!(url = %client.status_url(), "Watching stepd status");

    let mut poller = StatusPoller::new(Arc::new(client), PollerConfig::from(&config));
    let mut updates = poller.subscribe();
    let mut shown: Option<PollState> = None;
    poller.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if shown.as_ref().map_or(true, |prev| state.display_differs(prev)) {
                    println!("{}", render(&state));
                    shown = Some(state);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

fn render(state: &PollState) -> String {
    let health = if state.failed() {
        "FAILED"
    } else if state.updating {
        "updating"
    } else {
        "ok"
    };
    let when = state
        .last_update
        .map(|at| format_relative_time(at, Utc::now()))
        .unwrap_or_else(|| "never".to_string());
    format!(
        "[{health}] {} ({}={}, updated {when})",
        state.status,
        state.signal.field(),
        state.signal.is_set()
    )
}
