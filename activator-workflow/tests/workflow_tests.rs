mod common;

use activator_inventory::{InventoryError, KeyUpdate};
use activator_session::AuthFailure;
use activator_types::KeyStatus;
use activator_workflow::{ActivationError, ActivationPage, ActivatorError, RunReport};
use common::{
    signed_in_site, site_with_error, site_with_receipt, workflow, FakeInventory, FakeWebSession,
    USERNAME,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const KEY: &str = "ABCDE-FGHIJ";

// ── End-to-end scenarios ────────────────────────────────────────

#[tokio::test]
async fn activated_key_is_marked_used_by_account() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_receipt("Example Game");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let report = wf.run(&mut web).await.unwrap();

    assert_eq!(
        report,
        RunReport::Reported {
            key: KEY.to_string(),
            status: KeyStatus::Used
        }
    );
    assert_eq!(
        wf.inventory().recorded_updates(),
        vec![KeyUpdate {
            code: KEY.to_string(),
            product: Some("Example Game".to_string()),
            status: KeyStatus::Used,
            owner: Some(USERNAME.to_string()),
        }]
    );
    assert_eq!(
        web.typed_into(&ActivationPage::default().key_input),
        Some(KEY)
    );
}

#[tokio::test]
async fn invalid_key_is_reported_without_product_or_owner() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_error(
        "The product code you've entered is not valid. Please double check to see if \
         you've mistyped your key.",
    );
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let report = wf.run(&mut web).await.unwrap();

    assert_eq!(
        report,
        RunReport::Reported {
            key: KEY.to_string(),
            status: KeyStatus::Invalid
        }
    );
    assert_eq!(
        wf.inventory().recorded_updates(),
        vec![KeyUpdate {
            code: KEY.to_string(),
            product: None,
            status: KeyStatus::Invalid,
            owner: None,
        }]
    );
}

#[tokio::test]
async fn unrecognized_text_leaves_key_untouched() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_error("Server is on fire");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let err = wf.run(&mut web).await.unwrap_err();

    match err {
        ActivatorError::ActivationOutcome(ActivationError::Unrecognized(text)) => {
            assert_eq!(text, "Server is on fire");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(wf.inventory().recorded_updates().is_empty());
}

#[tokio::test]
async fn no_key_aborts_before_activation_page() {
    let dir = TempDir::new().unwrap();
    let mut web = signed_in_site();
    let mut wf = workflow(dir.path(), FakeInventory::empty());

    let err = wf.run(&mut web).await.unwrap_err();

    assert!(matches!(
        err,
        ActivatorError::Remote(InventoryError::NoKeyAvailable(KeyStatus::Unknown))
    ));
    assert!(!web
        .urls_visited()
        .contains(&ActivationPage::default().url.as_str()));
}

// ── Other outcomes ──────────────────────────────────────────────

#[tokio::test]
async fn rate_limit_records_nothing() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_error(
        "There have been too many recent activation attempts from this account or \
         Internet address. Please wait and try your product code again later.",
    );
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let report = wf.run(&mut web).await.unwrap();

    assert_eq!(
        report,
        RunReport::RateLimited {
            key: KEY.to_string()
        }
    );
    assert!(wf.inventory().recorded_updates().is_empty());
}

#[tokio::test]
async fn used_elsewhere_in_german() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_error(
        "Der eingegebene Produktcode wurde bereits durch ein anderes Steam-Konto aktiviert.",
    );
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    wf.run(&mut web).await.unwrap();

    assert_eq!(
        wf.inventory().recorded_updates(),
        vec![KeyUpdate {
            code: KEY.to_string(),
            product: Some("Unknown".to_string()),
            status: KeyStatus::UsedBySomeoneElse,
            owner: Some("Unknown".to_string()),
        }]
    );
}

#[tokio::test]
async fn receipt_without_product_name() {
    let dir = TempDir::new().unwrap();
    let page = ActivationPage::default();
    let mut web = signed_in_site().on_click(&page.submit, &[&page.receipt]);
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    wf.run(&mut web).await.unwrap();

    let updates = wf.inventory().recorded_updates();
    assert_eq!(updates[0].status, KeyStatus::Used);
    assert_eq!(updates[0].product.as_deref(), Some("Unknown"));
}

#[tokio::test]
async fn no_outcome_is_a_hard_failure() {
    let dir = TempDir::new().unwrap();
    let page = ActivationPage::default();
    let mut web = signed_in_site().on_click(&page.submit, &[]);
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let err = wf.run(&mut web).await.unwrap_err();

    assert!(matches!(
        err,
        ActivatorError::ActivationOutcome(ActivationError::NoOutcome)
    ));
    assert!(wf.inventory().recorded_updates().is_empty());
}

#[tokio::test]
async fn missing_form_is_a_browser_error() {
    let dir = TempDir::new().unwrap();
    let login = activator_session::LoginPage::default();
    let mut web = FakeWebSession::new()
        .page(&login.login_url, &[&login.avatar, &login.account_name])
        .text(&login.account_name, USERNAME);
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let err = wf.run(&mut web).await.unwrap_err();

    assert!(matches!(err, ActivatorError::Browser(_)));
}

// ── Failure propagation ─────────────────────────────────────────

#[tokio::test]
async fn authentication_failure_stops_before_inventory() {
    let dir = TempDir::new().unwrap();
    let login = activator_session::LoginPage::default();
    let mut web = FakeWebSession::new()
        .page(&login.login_url, &[&login.avatar, &login.account_name])
        .text(&login.account_name, "someone_else");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    let err = wf.run(&mut web).await.unwrap_err();

    assert!(matches!(
        err,
        ActivatorError::Authentication(AuthFailure::WrongAccount { .. })
    ));
    assert_eq!(wf.inventory().fetch_count(), 0);
}

#[tokio::test]
async fn failed_update_is_a_remote_error() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_receipt("Example Game");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY).failing_updates());

    let err = wf.run(&mut web).await.unwrap_err();

    assert!(matches!(err, ActivatorError::Remote(e) if e.is_transport()));
}

#[tokio::test]
async fn run_and_quit_releases_browser_on_success() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_receipt("Example Game");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    wf.run_and_quit(&mut web).await.unwrap();

    assert!(web.closed);
}

#[tokio::test]
async fn run_and_quit_releases_browser_on_failure() {
    let dir = TempDir::new().unwrap();
    let mut web = site_with_error("Server is on fire");
    let mut wf = workflow(dir.path(), FakeInventory::with_key(KEY));

    wf.run_and_quit(&mut web).await.unwrap_err();

    assert!(web.closed);
}
