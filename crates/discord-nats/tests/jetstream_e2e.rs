//! End-to-end test of the job queue against a real NATS server.
//!
//! Requires Docker (uses testcontainers to spin up NATS with JetStream).
//!
//! Run with:
//!   cargo test -p discord-nats --test jetstream_e2e

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_nats::jetstream::consumer::pull;
use discord_nats::{connect, consume, stream, JetStreamJobQueue, JobQueue, NatsConfig, QueueConfig};
use discord_types::{CommandJob, OptionValue};
use testcontainers_modules::nats::Nats;
use testcontainers_modules::testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};

// ── Shared helper ─────────────────────────────────────────────────────────────

async fn start_nats() -> (ContainerAsync<Nats>, u16) {
    let container: ContainerAsync<Nats> = Nats::default()
        .with_cmd(["--jetstream"])
        .start()
        .await
        .expect("Failed to start NATS container: is Docker running?");
    let port = container.get_host_port_ipv4(4222).await.unwrap();
    (container, port)
}

fn sample_job(token: &str) -> CommandJob {
    CommandJob::new("addquestion", "app-1", token, "chan-1", "user-1")
        .with_interaction_id(format!("ix-{token}"))
        .with_option("question", OptionValue::String("Capital of France?".into()))
}

#[tokio::test]
async fn e2e_enqueued_job_reaches_consumer_and_is_acked() {
    let (_container, port) = start_nats().await;
    let nats_config = NatsConfig::from_url(format!("localhost:{port}"), "e2e");
    let client = connect(&nats_config, "discord-nats-e2e").await.unwrap();
    let js = async_nats::jetstream::new(client.clone());
    let queue_config = QueueConfig::default().with_max_concurrency(2);

    stream::ensure_stream(&js, &nats_config.prefix, &queue_config)
        .await
        .unwrap();

    let queue = JetStreamJobQueue::new(js.clone(), &nats_config.prefix);
    queue.enqueue(&sample_job("tok-1")).await.unwrap();

    let received: Arc<Mutex<Vec<CommandJob>>> = Arc::new(Mutex::new(Vec::new()));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let sink = received.clone();
    let worker = tokio::spawn({
        let js = js.clone();
        let prefix = nats_config.prefix.clone();
        let queue_config = queue_config.clone();
        async move {
            consume(
                &js,
                &prefix,
                &queue_config,
                async move {
                    let _ = stop_rx.await;
                },
                move |job: CommandJob| {
                    let sink = sink.clone();
                    async move {
                        sink.lock().unwrap().push(job);
                        Ok::<_, std::convert::Infallible>(())
                    }
                },
            )
            .await
        }
    });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while received.lock().unwrap().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    stop_tx.send(()).unwrap();
    worker.await.unwrap().unwrap();

    let jobs = received.lock().unwrap().clone();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0], sample_job("tok-1"));

    // Work-queue retention: the acked job is gone from the stream.
    let mut s = js.get_stream(&queue_config.stream).await.unwrap();
    let info = s.info().await.unwrap();
    assert_eq!(info.state.messages, 0);
}

#[tokio::test]
async fn e2e_duplicate_enqueue_is_dropped_by_broker() {
    let (_container, port) = start_nats().await;
    let nats_config = NatsConfig::from_url(format!("localhost:{port}"), "e2e");
    let client = connect(&nats_config, "discord-nats-e2e").await.unwrap();
    let js = async_nats::jetstream::new(client);
    let queue_config = QueueConfig::default();

    stream::ensure_stream(&js, &nats_config.prefix, &queue_config)
        .await
        .unwrap();

    let queue = JetStreamJobQueue::new(js.clone(), &nats_config.prefix);
    let job = sample_job("tok-dup");
    queue.enqueue(&job).await.unwrap();
    queue.enqueue(&job).await.unwrap();

    let mut s = js.get_stream(&queue_config.stream).await.unwrap();
    let info = s.info().await.unwrap();
    assert_eq!(info.state.messages, 1);
}

#[tokio::test]
async fn e2e_saturated_worker_leaves_jobs_on_the_broker() {
    const JOBS: usize = 6;

    let (_container, port) = start_nats().await;
    let nats_config = NatsConfig::from_url(format!("localhost:{port}"), "e2e");
    let client = connect(&nats_config, "discord-nats-e2e").await.unwrap();
    let js = async_nats::jetstream::new(client);
    let queue_config = QueueConfig::default().with_max_concurrency(1);

    stream::ensure_stream(&js, &nats_config.prefix, &queue_config)
        .await
        .unwrap();

    let queue = JetStreamJobQueue::new(js.clone(), &nats_config.prefix);
    for i in 0..JOBS {
        queue.enqueue(&sample_job(&format!("tok-{i}"))).await.unwrap();
    }

    // Handlers wait here until the test hands out permits.
    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let worker = tokio::spawn({
        let js = js.clone();
        let prefix = nats_config.prefix.clone();
        let queue_config = queue_config.clone();
        let gate = gate.clone();
        let started = started.clone();
        let finished = finished.clone();
        async move {
            consume(
                &js,
                &prefix,
                &queue_config,
                async move {
                    let _ = stop_rx.await;
                },
                move |_job: CommandJob| {
                    let gate = gate.clone();
                    let started = started.clone();
                    let finished = finished.clone();
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        gate.acquire().await.unwrap().forget();
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, std::convert::Infallible>(())
                    }
                },
            )
            .await
        }
    });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while started.load(Ordering::SeqCst) == 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(started.load(Ordering::SeqCst), 1);
    // Give any over-eager pull time to land before looking.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let mut consumer = js
        .get_stream(&queue_config.stream)
        .await
        .unwrap()
        .get_consumer::<pull::Config>(&queue_config.consumer)
        .await
        .unwrap();
    let info = consumer.info().await.unwrap();
    assert!(
        info.num_ack_pending <= 2,
        "worker holds {} of {JOBS} jobs",
        info.num_ack_pending
    );
    assert!(info.num_pending >= (JOBS - 2) as u64);
    assert_eq!(started.load(Ordering::SeqCst), 1);

    gate.add_permits(JOBS);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while finished.load(Ordering::SeqCst) < JOBS && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    stop_tx.send(()).unwrap();
    worker.await.unwrap().unwrap();

    assert_eq!(finished.load(Ordering::SeqCst), JOBS);
    let mut s = js.get_stream(&queue_config.stream).await.unwrap();
    assert_eq!(s.info().await.unwrap().state.messages, 0);
}
