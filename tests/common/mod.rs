//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use webshield::config::{AuditBackend, WebShieldConfig};
use webshield::{HttpServer, Shutdown};
use webshield_sdk::{LogEntry, ShieldClient};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> ShieldClient {
        ShieldClient::new(&self.url())
    }

    /// Trigger graceful shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked");
    }
}

/// Defaults with the in-memory audit sink, so tests touch no files.
pub fn memory_config() -> WebShieldConfig {
    let mut config = WebShieldConfig::default();
    config.audit.backend = AuditBackend::Memory;
    config
}

pub async fn spawn_server(config: WebShieldConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config).unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            server.run(listener, shutdown).await.unwrap();
        }
    });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Poll `/logs` until at least `count` records are stored.
///
/// Stays under the default logs policy of 50 requests per minute.
#[allow(dead_code)]
pub async fn wait_for_logs(client: &ShieldClient, count: usize) -> Vec<LogEntry> {
    for _ in 0..40 {
        let logs = client.logs(None).await.unwrap();
        if logs.len() >= count {
            return logs;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("expected {count} stored scan records");
}
