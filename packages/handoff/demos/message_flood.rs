//! Several consumer threads draining one bounded channel as fast as a producer can fill it.
//!
//! The producer floods the channel with messages, then inserts one empty message per consumer.
//! Each consumer stops at the first empty message it receives.
//!
//! Run with `RUST_LOG=info cargo run --example message_flood`. `HANDOFF_CONSUMERS` and
//! `HANDOFF_MESSAGES` set the thread and message counts.

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use handoff::BoundedChannel;
use std::{env, thread, time::Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;


const CAPACITY: usize = 256;

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

    let consumers: usize = env_or("HANDOFF_CONSUMERS", 4)?;
    let messages: usize = env_or("HANDOFF_MESSAGES", 100_000)?;

    let chan = BoundedChannel::<Bytes>::new(CAPACITY);
    let start = Instant::now();

    let joins = (0..consumers)
        .map(|index| {
            let chan = chan.handle();
            thread::Builder::new()
                .name(format!("consumer-{}", index))
                .spawn(move || -> Result<usize> {
                    let mut consumed = 0;
                    loop {
                        let msg = chan.remove_head()?;
                        if msg.is_empty() {
                            break;
                        }
                        consumed += 1;
                        debug!(index, msg = ?msg, "consumed message");
                    }
                    Ok(consumed)
                })
                .context("failed to spawn consumer thread")
        })
        .collect::<Result<Vec<_>>>()?;

    let msg = Bytes::from_static(b"New Message");
    for _ in 0..messages {
        chan.insert_tail(msg.clone())?;
    }
    for _ in 0..consumers {
        chan.insert_tail(Bytes::new())?;
    }

    let mut total = 0;
    for (index, join) in joins.into_iter().enumerate() {
        let consumed = join.join()
            .map_err(|_| anyhow!("consumer {} panicked", index))??;
        info!(index, consumed, "consumer finished");
        total += consumed;
    }
    info!(total, elapsed = ?start.elapsed(), "flood drained");
    if total != messages {
        return Err(anyhow!("consumed {} messages, expected {}", total, messages));
    }
    Ok(())
}
