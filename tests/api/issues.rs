use chrono::{Days, Timelike, Utc};
use uuid::Uuid;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, body_partial_json, method, path},
};

use crate::helpers::{completion_body, spawn_app};

#[tokio::test]
async fn create_issue_returns_404_for_an_unknown_newsletter() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.ai_server)
        .await;

    let response = app.post_issue(&Uuid::new_v4().to_string()).await;

    assert_eq!(404, response.status().as_u16());
    assert_eq!(app.count_rows("newsletter_issues").await, 0);
}

#[tokio::test]
async fn create_issue_generates_content_from_the_newsletter_prompt() {
    let app = spawn_app().await;
    let newsletter_id = app
        .create_newsletter("Rust Weekly", "Summarise the week in Rust.")
        .await;

    Mock::given(path("/v1/chat/completions"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {
                    "role": "system",
                    "content": "Write a newsletter issue with the tone of a friendly AI assistant."
                },
                { "role": "user", "content": "Summarise the week in Rust." }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("This week in Rust...")),
        )
        .expect(1)
        .mount(&app.ai_server)
        .await;

    let response = app.post_issue(&newsletter_id.to_string()).await;

    assert_eq!(201, response.status().as_u16());
    let created: serde_json::Value = response.json().await.unwrap();
    let issue_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    let issue = app.get_issue(issue_id).await;
    assert_eq!(issue.newsletter_id, newsletter_id);
    assert_eq!(issue.content, "This week in Rust...");
    assert!(issue.sent_at.is_none());
}

#[tokio::test]
async fn create_issue_is_scheduled_for_nine_utc_tomorrow() {
    let app = spawn_app().await;
    let newsletter_id = app.create_newsletter("Rust Weekly", "Rust news.").await;
    app.mount_completion("Hello").await;

    let before = Utc::now();
    let response = app.post_issue(&newsletter_id.to_string()).await;
    let after = Utc::now();

    assert_eq!(201, response.status().as_u16());
    let created: serde_json::Value = response.json().await.unwrap();
    let scheduled: chrono::DateTime<Utc> = created["scheduled_send_at"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!((scheduled.hour(), scheduled.minute(), scheduled.second()), (9, 0, 0));
    let candidates = [
        before.date_naive() + Days::new(1),
        after.date_naive() + Days::new(1),
    ];
    assert!(candidates.contains(&scheduled.date_naive()));
}

#[tokio::test]
async fn create_issue_returns_500_when_generation_fails() {
    let app = spawn_app().await;
    let newsletter_id = app.create_newsletter("Rust Weekly", "Rust news.").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.ai_server)
        .await;

    let response = app.post_issue(&newsletter_id.to_string()).await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(app.count_rows("newsletter_issues").await, 0);
}
