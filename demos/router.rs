//! # Router Example
//!
//! Wires a router, two listeners and a tickler together:
//! - a [`LogListener`](hubcast::LogListener) that logs and acknowledges everything under `disk`
//! - a custom listener counting `net` events
//! - a tickler that wakes a producer every second; the producer feeds JSON batches
//!   through [`hubcast::ingest::ingest`] and prints the encoded reply
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example router --features logging
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use hubcast::{Ack, Config, Event, Listen, LogListener, Router, Tickler, envelope, ingest};
use tracing_subscriber::EnvFilter;

const TICK: u32 = 1;

struct NetCounter {
    seen: AtomicU64,
}

#[async_trait::async_trait]
impl Listen for NetCounter {
    async fn on_event(&self, ev: &Arc<Event>) -> Option<Ack> {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        Some(Ack::ok(format!("net event #{n}")).with_data(serde_json::json!({ "topic": ev.topic })))
    }

    fn name(&self) -> &'static str {
        "net-counter"
    }
}

fn payload(round: u32) -> String {
    format!(
        r#"{{"events": [
            {{"topic": "disk.sda", "ack": true, "data": {{"round": {round}}}}},
            {{"topic": "net.eth0", "ack": {}, "data": {{"round": {round}}}}}
        ]}}"#,
        round % 2 == 0
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let router = Router::builder(Config {
        ack_timeout: Duration::from_secs(5),
        ..Config::default()
    })
    .build();

    let net = Arc::new(NetCounter {
        seen: AtomicU64::new(0),
    });
    let _disk = router.listen("disk", LogListener::acking())?;
    let _net = router.listen("net", SharedNet(Arc::clone(&net)))?;

    let tickler: Tickler<&'static str> = Tickler::new(4);
    let (wake, mut wakeups) = envelope::channel(4);
    tickler.add(Duration::from_secs(1), wake, TICK, "produce", 3)?;

    let mut round = 0;
    while let Some(env) = wakeups.recv().await {
        round += 1;
        tracing::info!(kind = env.kind, what = env.request, round, "tick");

        let reply = ingest::ingest(&router, payload(round).as_bytes()).await;
        println!("round {round}: {}", String::from_utf8_lossy(&ingest::encode(&reply)));
    }

    let malformed = ingest::ingest(&router, b"{\"events\": 42}").await;
    println!("malformed: {}", String::from_utf8_lossy(&ingest::encode(&malformed)));

    router.shutdown().await;
    println!();
    println!("Stats:");
    println!(" └─► net events: {}", net.seen.load(Ordering::Relaxed));
    Ok(())
}

/// Lets `main` keep reading the counter after handing the listener to the router.
struct SharedNet(Arc<NetCounter>);

#[async_trait::async_trait]
impl Listen for SharedNet {
    async fn on_event(&self, ev: &Arc<Event>) -> Option<Ack> {
        self.0.on_event(ev).await
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}
