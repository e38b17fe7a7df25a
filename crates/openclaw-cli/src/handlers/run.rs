//! Run command handler.
//!
//! Starts the gateway in the foreground, prints every status and log event,
//! and stops the gateway on Ctrl-C. Exits with an error if the gateway fails
//! to start or dies while running.

use anyhow::Result;
use openclaw_core::{GatewayEvent, GatewayState, GatewayStatus, validate_settings};
use openclaw_runtime::{GatewaySupervisor, Subscription};
use tracing::{debug, info, warn};

use crate::commands::RunArgs;
use crate::error::CliError;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let settings = args.to_settings();
    validate_settings(&settings).map_err(CliError::from)?;

    let supervisor = GatewaySupervisor::new(settings);
    let json = args.json;
    let mut events = supervisor.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = print_event(&event, json) {
                warn!(error = %e, "Failed to print gateway event");
            }
        }
    });

    // Subscribed before start so an early exit cannot be missed.
    let mut lifecycle = supervisor.subscribe();

    let status = supervisor.start(args.launch.port).await;
    let outcome = if status.is_running() {
        info!(port = status.port(), pid = ?status.pid(), "Gateway is up, press Ctrl-C to stop");
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                info!("Interrupt received, stopping gateway");
                supervisor.stop().await;
                signal.map_err(CliError::from)
            }
            status = wait_until_down(&mut lifecycle) => Err(failure(&status)),
        }
    } else {
        Err(failure(&status))
    };

    // Dropping the last supervisor closes the bus, which ends the printer
    // once it has drained every queued event.
    supervisor.destroy();
    drop(lifecycle);
    drop(supervisor);
    if let Err(e) = printer.await {
        debug!(error = %e, "Event printer task ended abnormally");
    }

    outcome.map_err(Into::into)
}

/// Resolves with the first status that is no longer `Running`.
async fn wait_until_down(lifecycle: &mut Subscription) -> GatewayStatus {
    loop {
        match lifecycle.recv().await {
            Some(GatewayEvent::StatusChanged(status))
                if status.state().is_settled() && status.state() != GatewayState::Running =>
            {
                return status;
            }
            Some(_) => {}
            None => return GatewayStatus::stopped(0),
        }
    }
}

fn failure(status: &GatewayStatus) -> CliError {
    let reason = status
        .error_message()
        .map_or_else(|| format!("gateway is {}", status.state()), str::to_string);
    CliError::Gateway(reason)
}

fn print_event(event: &GatewayEvent, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        GatewayEvent::StatusChanged(status) => println!("status: {status}"),
        GatewayEvent::NewLog(record) => println!("{record}"),
    }
    Ok(())
}
