//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use web_addresses::config::SiteConfig;
use web_addresses::content::{ContentStore, MemoryStore, NewItem};
use web_addresses::http::HttpServer;
use web_addresses::lifecycle::Shutdown;
use web_addresses::plugin::default_plugins;
use web_addresses::Site;

/// Admin key used by test configs.
#[allow(dead_code)]
pub const ADMIN_KEY: &str = "test-admin-key";

/// The client records most tests run against.
pub fn clients() -> Vec<NewItem> {
    vec![
        NewItem::new("sw_client", "alice", "Alice Ltd").with_id(10),
        NewItem::new("sw_client", "bob", "Bob & Co").with_id(20),
        NewItem::new("sw_client", "bob", "Bob Holdings").with_id(21),
        NewItem::new("sw_client", "carol", "Carol plc").with_id(30),
    ]
}

/// Config with the admin API enabled.
#[allow(dead_code)]
pub fn admin_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

/// Start a site on an ephemeral port. Keep the `Shutdown` alive for the
/// duration of the test.
pub async fn spawn_site(config: SiteConfig, items: Vec<NewItem>) -> (SocketAddr, Shutdown) {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::with_items(items).expect("valid fixture items"));
    let site = Site::bootstrap(store.clone(), default_plugins(&config, store), config.site.posts_per_page)
        .expect("site bootstraps");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(site));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// HTTP client that never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
