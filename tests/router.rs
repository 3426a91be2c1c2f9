use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hubcast::envelope::{self, Inbox};
use hubcast::{Ack, Config, Event, Listen, Router, RouterError, Status};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn router() -> Router {
    init_tracing();
    Router::builder(Config::default()).build()
}

/// Answers every delivered event with `ack`.
fn answer_with(mut inbox: Inbox<Arc<Event>>, ack: Ack) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut accepted = 0;
        while let Some(env) = inbox.recv().await {
            if env.request.acknowledge(ack.clone()).await == Ok(true) {
                accepted += 1;
            }
        }
        accepted
    })
}

#[tokio::test]
async fn batch_without_acks_is_released_immediately() {
    let router = router();

    let endstate = router
        .submit(vec![
            Event::new("a", false),
            Event::new("b.c", false),
            Event::new("d", false),
        ])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Ok);
    assert_eq!(endstate.comment, "3 event(s) routed");
    router.shutdown().await;
}

#[tokio::test]
async fn unreachable_acknowledged_event_fails_the_batch() {
    let router = router();

    let endstate = router
        .submit(vec![Event::new("disk.full", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Error);
    assert!(endstate.comment.contains("disk.full"), "{}", endstate.comment);
    router.shutdown().await;
}

#[tokio::test]
async fn first_reply_wins_when_two_listeners_answer() {
    let router = router();
    let (wide, wide_inbox) = envelope::channel(8);
    let (narrow, narrow_inbox) = envelope::channel(8);
    router.register("disk", &wide).unwrap();
    router.register("disk.sda", &narrow).unwrap();
    let wide_task = answer_with(wide_inbox, Ack::ok("wide"));
    let narrow_task = answer_with(narrow_inbox, Ack::ok("narrow"));

    let endstate = router
        .submit(vec![Event::new("disk.sda", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Ok);
    assert_eq!(endstate.comment, "1 acknowledgement(s) received");
    let data = endstate.data.unwrap();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["topic"], "disk.sda");

    // Dropping the router's registrations lets both workers finish.
    router.shutdown().await;
    drop((wide, narrow));
    let accepted = wide_task.await.unwrap() + narrow_task.await.unwrap();
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn every_acknowledgement_is_collected_in_arrival_order() {
    let router = router();
    let (listener, inbox) = envelope::channel(8);
    router.register("job", &listener).unwrap();
    answer_with(inbox, Ack::ok("done").with_data(serde_json::json!({"code": 0})));

    let endstate = router
        .submit(vec![Event::new("job.one", true), Event::new("job.two", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Ok);
    assert_eq!(endstate.comment, "2 acknowledgement(s) received");
    let data = endstate.data.unwrap();
    assert_eq!(data[0]["topic"], "job.one");
    assert_eq!(data[1]["topic"], "job.two");
    assert_eq!(data[1]["data"]["code"], 0);
    router.shutdown().await;
}

#[tokio::test]
async fn error_acknowledgement_fails_the_batch() {
    let router = router();
    let (listener, inbox) = envelope::channel(8);
    router.register("deploy", &listener).unwrap();
    answer_with(inbox, Ack::error("image missing"));

    let endstate = router
        .submit(vec![Event::new("deploy.web", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "listener rejected deploy.web: image missing");
    router.shutdown().await;
}

#[tokio::test]
async fn overlapping_registrations_deliver_once_per_node() {
    let router = router();
    let (listener, mut inbox) = envelope::channel(8);
    router.register("net", &listener).unwrap();
    router.register("net.if", &listener).unwrap();

    router
        .submit(vec![Event::new("net.if.eth0", false)])
        .await
        .unwrap();
    assert!(inbox.try_recv().is_some());
    assert!(inbox.try_recv().is_some());
    assert!(inbox.try_recv().is_none());

    // Segment match, not string prefix.
    router
        .submit(vec![Event::new("net.interface", false)])
        .await
        .unwrap();
    assert_eq!(inbox.try_recv().unwrap().request.topic, "net.interface");
    assert!(inbox.try_recv().is_none());

    router.shutdown().await;
}

#[tokio::test]
async fn events_reach_listeners_in_batch_order() {
    let router = router();
    let (listener, mut inbox) = envelope::channel(16);
    router.register("q", &listener).unwrap();

    let events = (0..5).map(|i| Event::new(format!("q.{i}"), false)).collect();
    router.submit(events).await.unwrap();

    for i in 0..5 {
        let env = inbox.try_recv().unwrap();
        assert_eq!(env.kind, hubcast::kind::EVENT);
        assert_eq!(env.request.topic, format!("q.{i}"));
    }
    router.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn missing_acknowledgement_times_out() {
    init_tracing();
    let router = Router::builder(Config {
        ack_timeout: Duration::from_secs(5),
        ..Config::default()
    })
    .build();
    let (listener, _inbox) = envelope::channel(8);
    router.register("slow", &listener).unwrap();

    let start = tokio::time::Instant::now();
    let endstate = router
        .submit(vec![Event::new("slow.op", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "acknowledgement timeout: 1 of 1 missing");
    assert!(start.elapsed() >= Duration::from_secs(5));
    router.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn oversized_ack_timeout_is_clamped_and_router_survives() {
    init_tracing();
    let router = Router::builder(Config {
        ack_timeout: Duration::from_secs(4 * 365 * 24 * 60 * 60),
        ..Config::default()
    })
    .build();
    let (listener, _inbox) = envelope::channel(8);
    router.register("a", &listener).unwrap();

    let start = tokio::time::Instant::now();
    let endstate = router
        .submit(vec![Event::new("a.b", true)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "acknowledgement timeout: 1 of 1 missing");
    assert!(start.elapsed() >= hubcast::MAX_ACK_TIMEOUT);

    let endstate = router
        .submit(vec![Event::new("a.c", false)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Ok);
    router.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stalled_listener_queue_is_released_at_the_deadline() {
    init_tracing();
    let router = Router::builder(Config {
        ack_timeout: Duration::from_secs(5),
        ..Config::default()
    })
    .build();
    // Capacity 1, never drained: the second event cannot be queued.
    let (listener, _inbox) = envelope::channel(1);
    router.register("jam", &listener).unwrap();

    let start = tokio::time::Instant::now();
    let endstate = router
        .submit(vec![Event::new("jam.one", true), Event::new("jam.two", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "acknowledgement timeout: routing stalled on jam.two");
    assert!(start.elapsed() >= Duration::from_secs(5));

    // The dispatcher keeps serving other topics.
    let endstate = router
        .submit(vec![Event::new("other", false)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Ok);
    router.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_a_stalled_broadcast() {
    init_tracing();
    let router = Router::builder(Config {
        ack_timeout: Duration::ZERO,
        ..Config::default()
    })
    .build();
    let (listener, _inbox) = envelope::channel(1);
    router.register("jam", &listener).unwrap();

    let submitter = {
        let router = router.clone();
        tokio::spawn(async move {
            router
                .submit(vec![Event::new("jam.one", true), Event::new("jam.two", true)])
                .await
        })
    };
    // Let the dispatcher fill the queue and block on the second event.
    tokio::time::sleep(Duration::from_secs(1)).await;

    tokio::time::timeout(Duration::from_secs(60), router.shutdown())
        .await
        .expect("shutdown returned");
    let endstate = submitter.await.unwrap().unwrap();
    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "router shutting down");
}

#[tokio::test]
async fn unregistered_listener_no_longer_counts() {
    let router = router();
    let (listener, _inbox) = envelope::channel(8);
    router.register("cfg", &listener).unwrap();
    router.unregister("cfg", &listener).unwrap();

    let endstate = router
        .submit(vec![Event::new("cfg.reload", true)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Error);
    router.shutdown().await;
}

#[tokio::test]
async fn closed_listener_is_pruned() {
    let router = router();
    let (listener, inbox) = envelope::channel(8);
    router.register("gone", &listener).unwrap();
    drop(inbox);

    let endstate = router
        .submit(vec![Event::new("gone.away", true)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Error);
    router.shutdown().await;
}

#[tokio::test]
async fn registration_never_waits_for_queue_space() {
    init_tracing();
    let router = Router::builder(Config {
        queue_capacity: 1,
        ..Config::default()
    })
    .build();
    let (listener, _inbox) = envelope::channel(1);

    // The dispatcher has not been polled yet on this single-threaded runtime.
    router.register("a", &listener).unwrap();
    assert_eq!(router.register("b", &listener), Err(RouterError::Busy));
    router.shutdown().await;
}

#[tokio::test]
async fn shutdown_releases_pending_batches() {
    let router = router();
    let (listener, mut inbox) = envelope::channel(8);
    router.register("hold", &listener).unwrap();

    let submitter = {
        let router = router.clone();
        tokio::spawn(async move { router.submit(vec![Event::new("hold.on", true)]).await })
    };
    // Delivered, so the batch is pending.
    let _held = inbox.recv().await.unwrap();

    router.shutdown().await;
    let endstate = submitter.await.unwrap().unwrap();
    assert_eq!(endstate.status, Status::Error);
    assert_eq!(endstate.comment, "router shutting down");

    assert!(router.is_closed());
    assert_eq!(
        router.submit(vec![Event::new("hold", false)]).await,
        Err(RouterError::Closed)
    );
    assert_eq!(router.register("hold", &listener), Err(RouterError::Closed));
}

struct Flaky {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Listen for Flaky {
    async fn on_event(&self, ev: &Arc<Event>) -> Option<Ack> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        if ev.topic.ends_with("boom") {
            panic!("flaky listener exploded");
        }
        Some(Ack::ok("handled"))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }

    fn queue_capacity(&self) -> Option<usize> {
        Some(4)
    }
}

#[tokio::test]
async fn managed_listener_survives_panics() {
    let router = router();
    let seen = Arc::new(AtomicUsize::new(0));
    let handle = router
        .listen("svc", Flaky { seen: Arc::clone(&seen) })
        .unwrap();
    assert_eq!(handle.name(), "flaky");
    assert_eq!(handle.topic(), "svc");

    router
        .submit(vec![Event::new("svc.boom", false)])
        .await
        .unwrap();
    let endstate = router
        .submit(vec![Event::new("svc.ok", true)])
        .await
        .unwrap();

    assert_eq!(endstate.status, Status::Ok);
    assert_eq!(seen.load(Ordering::SeqCst), 2);

    handle.unregister().unwrap();
    let endstate = router
        .submit(vec![Event::new("svc.ok", true)])
        .await
        .unwrap();
    assert_eq!(endstate.status, Status::Error);
    router.shutdown().await;
}

#[tokio::test]
async fn cancelling_the_parent_token_stops_the_router() {
    init_tracing();
    let parent = tokio_util::sync::CancellationToken::new();
    let router = Router::builder(Config::default())
        .with_cancellation(&parent)
        .build();

    parent.cancel();
    assert!(router.is_closed());
    assert_eq!(
        router.submit(vec![Event::new("x", false)]).await,
        Err(RouterError::Closed)
    );
    router.shutdown().await;
}
