//! A worker thread woken by a gate each time a "button" is clicked.
//!
//! A clicker thread stands in for a UI event handler: it sets the gate on every click. The worker
//! handles the click and clears the gate to wait for the next one. To shut down, the main thread
//! raises an exit flag, sets the gate one last time so the worker notices, and joins it.
//!
//! Run with `RUST_LOG=info cargo run --example button_event`. `HANDOFF_CLICKS` sets the number
//! of clicks.

use anyhow::{anyhow, Context, Result};
use handoff::Gate;
use std::{
    env,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;


fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(val) => val.parse()
            .map_err(|_| anyhow!("invalid value for {}: {:?}", name, val)),
        Err(_) => Ok(default),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clicks: usize = env_or("HANDOFF_CLICKS", 5)?;

    let gate = Gate::new();
    let exiting = Arc::new(AtomicBool::new(false));

    let worker = {
        let gate = gate.handle();
        let exiting = Arc::clone(&exiting);
        thread::Builder::new()
            .name("worker".into())
            .spawn(move || {
                let mut handled = 0;
                while gate.wait().is_ok() {
                    if exiting.load(Ordering::Acquire) {
                        break;
                    }
                    handled += 1;
                    info!(handled, "button clicked");
                    gate.clear();
                }
                handled
            })
            .context("failed to spawn worker thread")?
    };

    for _ in 0..clicks {
        thread::sleep(Duration::from_millis(100));
        gate.set();
    }
    thread::sleep(Duration::from_millis(100));

    exiting.store(true, Ordering::Release);
    gate.set();
    let handled = worker.join()
        .map_err(|_| anyhow!("worker thread panicked"))?;
    info!(clicks, handled, "worker stopped");
    Ok(())
}
