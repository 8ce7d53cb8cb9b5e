//! Integration tests for the HTTP endpoints.
//!
//! The router is driven with `oneshot` requests; the provider is replaced by
//! in-memory ports, or by a wiremock server for the end-to-end case.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mailroom::api::{Contact, CreateContact, SendEmail, UpdateContact};
use mailroom::webhook::{now_secs, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use mailroom::{router, AppState, Client, Config, ContactDirectory, EmailGateway, Error, Result, Verifier};

const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleS0wMTIzNDU2Nzg5";

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct Directory {
    contacts: Mutex<Vec<Contact>>,
    updates: Mutex<Vec<UpdateContact>>,
    fail_list: bool,
}

impl Directory {
    fn with(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: Mutex::new(contacts),
            ..Default::default()
        }
    }

    fn updates(&self) -> Vec<UpdateContact> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactDirectory for Directory {
    async fn list_contacts(&self, _audience_id: &str) -> Result<Vec<Contact>> {
        if self.fail_list {
            return Err(Error::Api {
                status: 500,
                name: "internal_server_error".to_string(),
                message: "Upstream exploded".to_string(),
            });
        }
        Ok(self.contacts.lock().unwrap().clone())
    }

    async fn create_contact(&self, contact: CreateContact) -> Result<String> {
        let mut contacts = self.contacts.lock().unwrap();
        let id = format!("c_{}", contacts.len() + 1);
        contacts.push(Contact {
            id: id.clone(),
            email: contact.email,
            first_name: contact.first_name,
            last_name: contact.last_name,
            unsubscribed: contact.unsubscribed,
            created_at: None,
        });
        Ok(id)
    }

    async fn update_contact(&self, update: UpdateContact) -> Result<()> {
        self.updates.lock().unwrap().push(update);
        Ok(())
    }
}

#[derive(Default)]
struct Gateway {
    sent: Mutex<Vec<SendEmail>>,
    fail: bool,
}

impl Gateway {
    fn sent(&self) -> Vec<SendEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailGateway for Gateway {
    async fn send_email(&self, email: SendEmail) -> Result<String> {
        if self.fail {
            return Err(Error::Api {
                status: 422,
                name: "validation_error".to_string(),
                message: "Invalid `to` field.".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email);
        Ok("em_1".to_string())
    }
}

fn contact(id: &str, email: &str, unsubscribed: bool) -> Contact {
    Contact {
        id: id.to_string(),
        email: email.to_string(),
        first_name: None,
        last_name: None,
        unsubscribed,
        created_at: None,
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn config() -> Config {
    Config {
        api_key: Some(Secret::new("re_test".to_string())),
        api_base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_ms: 2000,
        email_from: "Acme <onboarding@resend.dev>".to_string(),
        audience_id: Some("aud_1".to_string()),
        confirm_redirect_url: "https://example.com/confirmed".to_string(),
        port: 0,
        webhook_secret: Some(Secret::new(SECRET.to_string())),
        webhook_tolerance_secs: 300,
        webhook_max_body_bytes: 1024 * 1024,
    }
}

fn app(config: Config, directory: Arc<Directory>, gateway: Arc<Gateway>) -> Router {
    router(AppState::with_ports(config, directory, gateway))
}

fn default_app() -> (Router, Arc<Directory>, Arc<Gateway>) {
    let directory = Arc::new(Directory::with(vec![contact("c1", "a@x.com", true)]));
    let gateway = Arc::new(Gateway::default());
    (app(config(), directory.clone(), gateway.clone()), directory, gateway)
}

fn json_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn signed_request(uri: &str, payload: &[u8]) -> Request<Body> {
    let timestamp = now_secs();
    let signature = Verifier::new(SECRET, 300)
        .unwrap()
        .sign("msg_1", timestamp, payload);

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(HEADER_ID, "msg_1")
        .header(HEADER_TIMESTAMP, timestamp.to_string())
        .header(HEADER_SIGNATURE, signature)
        .body(Body::from(payload.to_vec()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn click(to: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({ "type": "email.clicked", "data": { "to": to } })).unwrap()
}

// =============================================================================
// /health and /send
// =============================================================================

#[tokio::test]
async fn test_health_returns_ok() {
    let (app, _, _) = default_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_send_wraps_message_in_paragraph() {
    let (app, _, gateway) = default_app();

    let response = app
        .oneshot(json_request(
            "/send",
            r#"{"to":"a@x.com","subject":"Hi","message":"1 < 2"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "success": true, "id": "em_1" }));

    let sent = gateway.sent();
    assert_eq!(sent[0].from, "Acme <onboarding@resend.dev>");
    assert_eq!(sent[0].html.as_deref(), Some("<p>1 &lt; 2</p>"));
}

#[tokio::test]
async fn test_send_rejects_malformed_body() {
    let (app, _, _) = default_app();

    let response = app.oneshot(json_request("/send", "{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_send_requires_all_fields() {
    let (app, _, gateway) = default_app();

    let response = app
        .oneshot(json_request("/send", r#"{"to":"a@x.com","subject":"Hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "Missing required fields: to, subject, message" })
    );
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn test_send_provider_failure_is_500() {
    let directory = Arc::new(Directory::default());
    let gateway = Arc::new(Gateway {
        fail: true,
        ..Default::default()
    });

    let response = app(config(), directory, gateway)
        .oneshot(json_request(
            "/send",
            r#"{"to":"a@x.com","subject":"Hi","message":"x"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await, json!({ "error": "Invalid `to` field." }));
}

// =============================================================================
// /webhook
// =============================================================================

#[tokio::test]
async fn test_webhook_acknowledges_verified_event() {
    let (app, _, _) = default_app();
    let payload = br#"{"type":"email.delivered","data":{"email_id":"em_9"}}"#;

    let response = app.oneshot(signed_request("/webhook", payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "received": true, "type": "email.delivered" })
    );
}

#[tokio::test]
async fn test_webhook_missing_headers() {
    let (app, _, _) = default_app();

    let response = app
        .oneshot(json_request("/webhook", r#"{"type":"email.delivered"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({ "error": "Missing webhook headers" }));
}

#[tokio::test]
async fn test_webhook_tampered_body_is_rejected() {
    let (app, _, _) = default_app();
    let mut request = signed_request("/webhook", br#"{"type":"email.delivered"}"#);
    *request.body_mut() = Body::from(r#"{"type":"email.bounced"}"#);

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({ "error": "Invalid webhook signature" }));
}

#[tokio::test]
async fn test_webhook_secret_not_configured() {
    let mut config = config();
    config.webhook_secret = None;
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));

    let response = app
        .oneshot(signed_request("/webhook", br#"{"type":"email.delivered"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await, json!({ "error": "Webhook secret not configured" }));
}

#[tokio::test]
async fn test_webhook_invalid_secret() {
    let mut config = config();
    config.webhook_secret = Some(Secret::new("whsec_***not-base64***".to_string()));
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));

    let response = app
        .oneshot(signed_request("/webhook", br#"{"type":"email.delivered"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await, json!({ "error": "Invalid webhook secret" }));
}

#[tokio::test]
async fn test_webhook_unparsable_payload() {
    let (app, _, _) = default_app();

    let response = app
        .oneshot(signed_request("/webhook", b"not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await, json!({ "error": "Invalid webhook payload" }));
}

#[tokio::test]
async fn test_webhook_body_over_limit_is_413() {
    let mut config = config();
    config.webhook_max_body_bytes = 64;
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));
    let payload = format!(
        r#"{{"type":"email.received","data":{{"text":"{}"}}}}"#,
        "x".repeat(256)
    );

    let response = app
        .oneshot(signed_request("/webhook", payload.as_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// /double-optin/subscribe
// =============================================================================

#[tokio::test]
async fn test_subscribe_creates_pending_contact() {
    let directory = Arc::new(Directory::default());
    let gateway = Arc::new(Gateway::default());
    let app = app(config(), directory.clone(), gateway.clone());

    let response = app
        .oneshot(json_request(
            "/double-optin/subscribe",
            r#"{"email":"jane@x.com","name":"Jane"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "success": true,
            "message": "Confirmation email sent",
            "contact_id": "c_1",
            "email_id": "em_1"
        })
    );
    assert!(directory.contacts.lock().unwrap()[0].unsubscribed);
    assert!(gateway.sent()[0]
        .html
        .as_deref()
        .unwrap()
        .contains("https://example.com/confirmed"));
}

#[tokio::test]
async fn test_subscribe_requires_email() {
    let (app, _, _) = default_app();

    let response = app
        .oneshot(json_request("/double-optin/subscribe", r#"{"name":"Jane"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "Missing required field: email" })
    );
}

#[tokio::test]
async fn test_subscribe_without_audience_is_500() {
    let mut config = config();
    config.audience_id = None;
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));

    let response = app
        .oneshot(json_request("/double-optin/subscribe", r#"{"email":"a@x.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "RESEND_AUDIENCE_ID not configured" })
    );
}

// =============================================================================
// /double-optin/webhook
// =============================================================================

#[tokio::test]
async fn test_optin_webhook_confirms_contact() {
    let (app, directory, _) = default_app();

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!(["a@x.com"]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "received": true,
            "type": "email.clicked",
            "confirmed": true,
            "email": "a@x.com",
            "contact_id": "c1"
        })
    );
    let updates = directory.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].id, "c1");
    assert_eq!(updates[0].unsubscribed, Some(false));
}

#[tokio::test]
async fn test_optin_webhook_ignores_other_events_without_audience() {
    let mut config = config();
    config.audience_id = None;
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));
    let payload = br#"{"type":"email.opened","data":{"to":["a@x.com"]}}"#;

    let response = app
        .oneshot(signed_request("/double-optin/webhook", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "received": true, "type": "email.opened", "message": "Event type ignored" })
    );
}

#[tokio::test]
async fn test_optin_webhook_ignores_non_object_data() {
    let (app, directory, _) = default_app();
    let payload = br#"{"type":"email.delivered","data":null}"#;

    let response = app
        .oneshot(signed_request("/double-optin/webhook", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "received": true, "type": "email.delivered", "message": "Event type ignored" })
    );
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn test_webhook_accepts_non_object_data() {
    let (app, _, _) = default_app();
    let payload = br#"{"type":"email.bounced","data":[]}"#;

    let response = app.oneshot(signed_request("/webhook", payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "received": true, "type": "email.bounced" })
    );
}

#[tokio::test]
async fn test_optin_webhook_click_with_scalar_data_is_400() {
    let (app, directory, _) = default_app();
    let payload = br#"{"type":"email.clicked","data":"x"}"#;

    let response = app
        .oneshot(signed_request("/double-optin/webhook", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "No recipient in webhook data" })
    );
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn test_optin_webhook_click_without_audience_is_500() {
    let mut config = config();
    config.audience_id = None;
    let app = app(config, Arc::new(Directory::default()), Arc::new(Gateway::default()));

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!(["a@x.com"]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_optin_webhook_empty_recipients_is_400() {
    let (app, directory, _) = default_app();

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!([]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "No recipient in webhook data" })
    );
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn test_optin_webhook_unknown_contact_is_404() {
    let (app, directory, _) = default_app();

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!(["missing@x.com"]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await, json!({ "error": "Contact not found" }));
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn test_optin_webhook_directory_failure_is_500() {
    let directory = Arc::new(Directory {
        fail_list: true,
        ..Default::default()
    });
    let app = app(config(), directory, Arc::new(Gateway::default()));

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!(["a@x.com"]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await, json!({ "error": "Upstream exploded" }));
}

#[tokio::test]
async fn test_optin_webhook_stale_timestamp_is_rejected() {
    let (app, directory, _) = default_app();
    let payload = click(json!(["a@x.com"]));
    let stale = now_secs() - 3600;
    let signature = Verifier::new(SECRET, 300)
        .unwrap()
        .sign("msg_1", stale, &payload);

    let request = Request::builder()
        .method("POST")
        .uri("/double-optin/webhook")
        .header(HEADER_ID, "msg_1")
        .header(HEADER_TIMESTAMP, stale.to_string())
        .header(HEADER_SIGNATURE, signature)
        .body(Body::from(payload))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(directory.updates().is_empty());
}

// =============================================================================
// End to end against a mocked provider
// =============================================================================

#[tokio::test]
async fn test_confirmation_through_api_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audiences/aud_1/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "id": "c1", "email": "a@x.com", "unsubscribed": true }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/audiences/aud_1/contacts/c1"))
        .and(body_partial_json(json!({ "unsubscribed": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "contact",
            "id": "c1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new("re_test", &server.uri(), Duration::from_secs(2)).unwrap();
    let app = router(AppState::new(config(), client));

    let response = app
        .oneshot(signed_request("/double-optin/webhook", &click(json!(["a@x.com"]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["contact_id"], "c1");
}
