use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::Response;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use vibeletter::{
    configuration::{DatabaseSettings, get_configuration},
    domain::Issue,
    repository,
    startup::{Application, ApplicationContext},
    telemetry::{get_subscriber, init_subscriber},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub email_server: MockServer,
    pub ai_server: MockServer,
    pub context: ApplicationContext,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_newsletter(&self, body: &serde_json::Value) -> Response {
        self.api_client
            .post(format!("{}/api/newsletters", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_newsletters(&self) -> Response {
        self.api_client
            .get(format!("{}/api/newsletters", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_subscription(
        &self,
        newsletter_id: &str,
        body: &serde_json::Value,
    ) -> Response {
        self.api_client
            .post(format!(
                "{}/api/newsletters/{}/subscribe",
                &self.address, newsletter_id
            ))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_issue(&self, newsletter_id: &str) -> Response {
        self.api_client
            .post(format!(
                "{}/api/newsletters/{}/issues",
                &self.address, newsletter_id
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Creates a newsletter through the API and returns its id.
    pub async fn create_newsletter(&self, name: &str, prompt: &str) -> Uuid {
        let response = self
            .post_newsletter(&serde_json::json!({ "name": name, "prompt": prompt }))
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn subscribe(&self, newsletter_id: Uuid, email: &str) {
        let response = self
            .post_subscription(
                &newsletter_id.to_string(),
                &serde_json::json!({ "email": email }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
    }

    pub async fn insert_issue(
        &self,
        newsletter_id: Uuid,
        content: &str,
        scheduled_send_at: DateTime<Utc>,
    ) -> Issue {
        let mut connection = self.db_pool.acquire().await.unwrap();
        repository::insert_issue(&mut connection, newsletter_id, content, scheduled_send_at)
            .await
            .expect("Failed to insert an issue.")
    }

    pub async fn get_issue(&self, issue_id: Uuid) -> Issue {
        sqlx::query_as::<_, Issue>(
            "SELECT id, newsletter_id, content, scheduled_send_at, sent_at \
             FROM newsletter_issues WHERE id = $1",
        )
        .bind(issue_id)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to fetch the issue.")
    }

    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count rows.")
    }

    /// Every call to the AI API answers with `content`.
    pub async fn mount_completion(&self, content: &str) {
        Mock::given(path("/v1/chat/completions"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&self.ai_server)
            .await;
    }
}

pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database");

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate database");

    connection_pool
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let ai_server = MockServer::start().await;

    let config = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.database.database_name = Uuid::new_v4().to_string();
        c.database.migrate_on_startup = false;
        c.app.port = 0;
        c.email_client.base_url = email_server.uri();
        c.content_generator.base_url = ai_server.uri();
        c
    };

    let db_pool = configure_database(&config.database).await;

    let application = Application::build(config)
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.get_port());
    let context = application.context().clone();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        db_pool,
        email_server,
        ai_server,
        context,
        api_client: reqwest::Client::new(),
    }
}
