use activator_session::{
    Browser, Cookie, Locator, WebDriverConfig, WebDriverSession, WebError, WebSession,
};
use chrono::DateTime;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn config(server: &MockServer) -> WebDriverConfig {
    WebDriverConfig {
        url: server.uri(),
        browser: Browser::Chrome,
        headless: true,
        page_load_timeout: Duration::from_secs(12),
    }
}

async fn started(server: &MockServer) -> WebDriverSession {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { "sessionId": "s1", "capabilities": {} }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/timeouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .mount(server)
        .await;
    WebDriverSession::start(&config(server)).await.unwrap()
}

async fn element_found(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { ELEMENT_KEY: id }
        })))
        .mount(server)
        .await;
}

fn no_such_element() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "value": { "error": "no such element", "message": "Unable to locate element" }
    }))
}

// ── Session lifecycle ───────────────────────────────────────────

#[tokio::test]
async fn start_requests_headless_chrome_and_page_timeout() {
    let server = MockServer::start().await;
    let session = started(&server).await;
    assert_eq!(session.session_id(), "s1");

    let requests = server.received_requests().await.unwrap();
    let create: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let args = &create["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
    assert!(args.as_array().unwrap().contains(&json!("--headless=new")));

    let timeouts: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(timeouts, json!({ "pageLoad": 12000 }));
}

#[tokio::test]
async fn start_surfaces_driver_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "session not created", "message": "Chrome failed to start" }
        })))
        .mount(&server)
        .await;

    let err = WebDriverSession::start(&config(&server)).await.err().unwrap();
    match err {
        WebError::WebDriver { error, message } => {
            assert_eq!(error, "session not created");
            assert_eq!(message, "Chrome failed to start");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn quit_deletes_session_once() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/session/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    session.quit().await.unwrap();
    session.quit().await.unwrap();

    let err = session.go_to("https://example.com").await.unwrap_err();
    assert!(matches!(err, WebError::Closed));
}

// ── Elements ────────────────────────────────────────────────────

#[tokio::test]
async fn missing_element_is_not_visible() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    assert!(!session.is_visible(&Locator::id("receipt_form")).await.unwrap());
}

#[tokio::test]
async fn id_locator_becomes_css_selector() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .and(body_partial_json(json!({
            "using": "css selector",
            "value": "[id=\"error_display\"]"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": { ELEMENT_KEY: "e1" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/e1/displayed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
        .mount(&server)
        .await;

    assert!(session.is_visible(&Locator::id("error_display")).await.unwrap());
}

#[tokio::test]
async fn text_of_element() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    element_found(&server, "e7").await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/e7/text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "Example Game" })))
        .mount(&server)
        .await;

    let text = session.text(&Locator::css(".registerkey_lineitem")).await.unwrap();
    assert_eq!(text, "Example Game");
}

#[tokio::test]
async fn click_on_missing_element_fails() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    let err = session.click(&Locator::id("register_btn")).await.unwrap_err();
    assert!(matches!(err, WebError::ElementNotFound(_)));
}

#[tokio::test]
async fn checkbox_already_ticked_is_left_alone() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    element_found(&server, "cb").await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/cb/selected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element/cb/click"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(0)
        .mount(&server)
        .await;

    session
        .set_checkbox(&Locator::id("accept_ssa"), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn wait_for_any_times_out() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(no_such_element())
        .mount(&server)
        .await;

    let a = Locator::id("error_display");
    let b = Locator::id("receipt_form");
    let found = session
        .wait_for_any(&[&a, &b], Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(found, None);
}

// ── Cookies ─────────────────────────────────────────────────────

#[tokio::test]
async fn reads_cookie_jar() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("GET"))
        .and(path("/session/s1/cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "name": "steamLoginSecure",
                    "value": "abc",
                    "domain": ".steampowered.com",
                    "path": "/",
                    "secure": true,
                    "httpOnly": true,
                    "expiry": 1900000000
                },
                { "name": "sessionid", "value": "xyz", "domain": "store.steampowered.com" }
            ]
        })))
        .mount(&server)
        .await;

    let jar = session.cookies().await.unwrap();
    assert_eq!(jar.len(), 2);
    assert!(jar[0].http_only);
    assert_eq!(jar[0].expiry, DateTime::from_timestamp(1_900_000_000, 0));
    assert_eq!(jar[1], Cookie::new("store.steampowered.com", "sessionid", "xyz"));
}

#[tokio::test]
async fn replace_clears_then_adds() {
    let server = MockServer::start().await;
    let mut session = started(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/session/s1/cookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/cookie"))
        .and(body_partial_json(json!({
            "cookie": { "name": "sid", "value": "v", "domain": "example.com", "httpOnly": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
        .expect(1)
        .mount(&server)
        .await;

    session
        .replace_cookies(&[Cookie::new("example.com", "sid", "v")])
        .await
        .unwrap();
}
