use crate::configuration::{DatabaseSettings, Settings};
use crate::content_generator::ContentGenerator;
use crate::email_client::EmailClient;
use crate::routes::{create_issue, create_newsletter, health_check, list_newsletters, subscribe};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

#[derive(Clone)]
pub struct ApplicationContext {
    pub db_pool: PgPool,
    pub email_client: EmailClient,
    pub content_generator: ContentGenerator,
}

impl ApplicationContext {
    pub fn build(config: &Settings) -> Result<Self, anyhow::Error> {
        let email_client = config
            .email_client
            .clone()
            .client()
            .context("Invalid email client configuration.")?;
        let content_generator = config
            .content_generator
            .clone()
            .client()
            .context("Invalid content generator configuration.")?;

        Ok(Self {
            db_pool: get_connection_pool(&config.database),
            email_client,
            content_generator,
        })
    }
}

pub struct Application {
    port: u16,
    server: Server,
    context: ApplicationContext,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let context = ApplicationContext::build(&config)?;

        if config.database.migrate_on_startup {
            sqlx::migrate!("./migrations")
                .run(&context.db_pool)
                .await
                .context("Failed to migrate the database.")?;
        }

        let address = format!("{}:{}", config.app.host, config.app.port);
        let listener =
            TcpListener::bind(&address).with_context(|| format!("Failed to bind {address}."))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, context.clone())?;

        Ok(Self {
            port,
            server,
            context,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, context: ApplicationContext) -> Result<Server, anyhow::Error> {
    let context = web::Data::new(context);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/newsletters", web::post().to(create_newsletter))
                    .route("/newsletters", web::get().to(list_newsletters))
                    .route("/newsletters/{newsletter_id}/subscribe", web::post().to(subscribe))
                    .route("/newsletters/{newsletter_id}/issues", web::post().to(create_issue)),
            )
            .app_data(context.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_pool(db_config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(db_config.with_db())
}
