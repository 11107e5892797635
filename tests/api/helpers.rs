use landing::configuration::Settings;
use landing::provider::ForwardingKind;
use landing::startup::Application;
use landing::telemetry::{get_tracing_subscriber, init_tracing_subscriber};
use once_cell::sync::Lazy;
use secrecy::Secret;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-mailerlite-key";
pub const TEST_GROUP_ID: &str = "153054000726410998";

pub struct TestApp {
    pub addr: String,
    pub port: u16,
    pub provider_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", self.addr))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_subscribe_raw(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_consent(&self, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.api_client.get(&format!("{}/api/consent", self.addr));
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn post_consent(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/consent", self.addr))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_consent(&self) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}/api/consent", self.addr))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_viewport(&self, query: &str, headers: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self
            .api_client
            .get(&format!("{}/api/viewport{}", self.addr, query));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.expect("Failed to execute request")
    }
}

static TRACING: Lazy<()> = Lazy::new(|| {
    let test_name = "test_app";
    let default_log_level = "debug";
    if std::env::var("TEST_LOG").is_ok() {
        init_tracing_subscriber(get_tracing_subscriber(
            test_name,
            default_log_level,
            std::io::stdout,
        ));
    } else {
        init_tracing_subscriber(get_tracing_subscriber(
            test_name,
            default_log_level,
            std::io::sink,
        ));
    }
});

pub async fn spawn_app() -> TestApp {
    // once_cell make sure it is only run once on entire program lifetime
    Lazy::force(&TRACING);

    // Stands in for MailerLite
    let provider_server = MockServer::start().await;

    let settings = {
        let mut settings = Settings::get_configuration().expect("Failed to read configuration");

        // Use port 0 to ask the OS to pick a random free port
        settings.application.port = 0;
        settings.provider.kind = ForwardingKind::MailerLite;
        settings.provider.api_base_url = provider_server.uri();
        settings.provider.api_key = Secret::new(TEST_API_KEY.into());
        settings.provider.group_id = Some(TEST_GROUP_ID.into());
        settings
    };

    let app = Application::build(settings)
        .await
        .expect("Failed to build Server");
    let port = app.port();
    let addr = format!("http://127.0.0.1:{}", port);

    // tokio::test terminates the spawned server when the test finishes
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        port,
        provider_server,
        api_client: reqwest::Client::new(),
    }
}
