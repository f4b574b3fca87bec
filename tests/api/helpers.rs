use contact_relay::configuration::{get_configuration, ContactSettings};
use contact_relay::contact_form::ContactApi;
use contact_relay::startup::Application;
use contact_relay::telemetry;
use once_cell::sync::Lazy;
use secrecy::Secret;
use wiremock::MockServer;

pub const API_KEY: &str = "re_test_key";
pub const TO_EMAIL: &str = "owner@example.com";
pub const FROM_EMAIL: &str = "portfolio@example.com";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the type returned by `get_subscriber`, hence the two branches.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        telemetry::init_subscriber(subscriber);
    } else {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        telemetry::init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub email_server: MockServer,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/api/contact", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub fn contact_api(&self) -> ContactApi {
        ContactApi::new(&self.address)
    }

    /// The JSON bodies the email provider received, in order.
    pub async fn dispatched_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .iter()
            .map(|r| serde_json::from_slice(&r.body).expect("The provider got a non-JSON body"))
            .collect()
    }
}

pub fn configured_contact() -> ContactSettings {
    ContactSettings {
        api_key: Some(Secret::new(API_KEY.into())),
        to_email: Some(TO_EMAIL.into()),
        from_email: Some(FROM_EMAIL.into()),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(configured_contact()).await
}

/// Launch the application in the background, with a mock server standing in for the email
/// provider. Setup failures panic: there is nothing sensible to do in a test but crash.
pub async fn spawn_app_with(contact: ContactSettings) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c.contact = contact;
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        port,
        email_server,
    }
}
