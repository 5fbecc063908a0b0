//! Maps the four external signals onto `Control` actions: SIGUSR1 starts,
//! SIGUSR2 stops-and-flushes, SIGHUP resets, SIGINT/SIGTERM terminate. Each
//! handler only ever calls a `Control` method — no signal-specific logic
//! lives outside this module.

use session_core::Control;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Listen for signals until SIGINT or SIGTERM arrives, then clean up and
/// return. The caller exits the process afterward.
pub async fn listen(control: Control) -> anyhow::Result<()> {
    let mut usr1 = signal(SignalKind::user_defined1())?;
    let mut usr2 = signal(SignalKind::user_defined2())?;
    let mut hup = signal(SignalKind::hangup())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = usr1.recv() => {
                info!("SIGUSR1: start");
                control.start();
            }
            _ = usr2.recv() => {
                info!("SIGUSR2: stop-and-flush");
                control.stop_and_flush().await;
            }
            _ = hup.recv() => {
                info!("SIGHUP: reset");
                control.reset().await;
            }
            _ = int.recv() => {
                info!("SIGINT: terminate");
                break;
            }
            _ = term.recv() => {
                info!("SIGTERM: terminate");
                break;
            }
        }
    }

    control.cleanup();
    Ok(())
}
