pub mod configuration;
pub mod content_generator;
pub mod daily_issue_job;
pub mod domain;
pub mod email_client;
pub mod issue_delivery_worker;
pub mod repository;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod telemetry;
