#![allow(dead_code, missing_docs, clippy::expect_used)]
use rstest::fixture;
use tracing::info;

use portfolio_client::{ApiClient, CredentialStore, MemoryLocation, SessionStorage};

mod backend;
pub use self::backend::*;

pub const TOKEN: &str = "jwt-token";

pub const EXPIRED_TARGET: &str = "/login?message=Session%20expired%3B%20please%20log%20in%20again.";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A logged-in page talking to a test backend.
#[derive(Debug, Clone)]
pub struct Session {
    pub backend: TestBackend,
    pub storage: SessionStorage,
    pub location: MemoryLocation,
    pub client: ApiClient,
}

impl Session {
    pub async fn start(token: Option<&str>, page: &str) -> anyhow::Result<Self> {
        let backend = TestBackend::start().await?;
        let storage = SessionStorage::new();
        storage.write(token);
        let location = MemoryLocation::new(page);

        let client = ApiClient::builder()
            .with_client(reqwest::Client::builder().no_proxy().build()?)
            .with_host("127.0.0.1")
            .with_port(backend.port())
            .with_credentials(storage.clone())
            .with_location(location.clone())
            .build()?;

        Ok(Self {
            backend,
            storage,
            location,
            client,
        })
    }
}

#[fixture]
pub async fn session() -> Session {
    init_tracing();
    match Session::start(Some(TOKEN), "/rulesets").await {
        Ok(session) => session,
        Err(error) => {
            panic!("fail to start test session: {error:?}");
        }
    }
}

#[fixture]
pub async fn anonymous() -> Session {
    init_tracing();
    match Session::start(None, "/login").await {
        Ok(session) => session,
        Err(error) => {
            panic!("fail to start test session: {error:?}");
        }
    }
}
