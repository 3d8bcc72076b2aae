//! Integration tests for tistory-runner
//!
//! These tests require Chrome and a matching chromedriver on PATH.
//! Run with: cargo test --test integration -- --ignored

use std::path::PathBuf;
use tistory_runner::{
    BatchRunner, EditorNavigator, EditorSurface, Error, LogProgress, PostComposer, RunnerConfig,
    Session,
};

/// Check if chromedriver is available
fn chromedriver_available() -> bool {
    std::process::Command::new("chromedriver")
        .arg("--version")
        .output()
        .is_ok()
}

fn test_config() -> RunnerConfig {
    let mut config = RunnerConfig::default();
    config.browser.headless = true;
    // keep the negative-path waits short
    config.waits.element_secs = 2;
    config.waits.window_secs = 2;
    config.waits.alert_secs = 1;
    config
}

async fn provision(config: &RunnerConfig) -> Session {
    Session::provision(&config.browser, &config.waits)
        .await
        .expect("Failed to provision browser")
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_provision_and_teardown() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    assert_eq!(session.window_count().await.expect("window count"), 1);
    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_missing_write_button_is_detected_within_wait() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    session
        .navigate("data:text/html,<p>not the landing page</p>")
        .await
        .expect("Failed to navigate");

    let mut navigator = EditorNavigator::new(&session, &config.selectors);
    let result = navigator.open_markdown_editor().await;
    assert!(matches!(result, Err(Error::WriteButtonMissing)));

    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_alert_probe_absence_is_normal() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    session
        .navigate("data:text/html,<p>quiet page</p>")
        .await
        .expect("Failed to navigate");

    let dismissed = session
        .dismiss_alert_if_present(std::time::Duration::from_secs(1))
        .await;
    assert!(!dismissed);

    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_late_rendering_code_surface_is_still_resolved() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    // the markdown widget shows up well after the page does
    session
        .navigate(
            "data:text/html,<body><script>setTimeout(function(){\
             var c=document.createElement('div');\
             c.id='markdown-editor-container';\
             c.innerHTML='<div class=\"CodeMirror-code\"></div>';\
             document.body.appendChild(c);},800);</script></body>",
        )
        .await
        .expect("Failed to navigate");

    let surface = EditorSurface::resolve(&session, &config.selectors)
        .await
        .expect("resolve");
    assert_eq!(surface, Some(EditorSurface::Code));

    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_clipboard_failure_does_not_fail_the_body_write() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    // data: pages are an insecure context, so the clipboard write rejects;
    // the composer must still reach the surface lookup and report that
    session
        .navigate("data:text/html,<p>no clipboard, no editor</p>")
        .await
        .expect("Failed to navigate");

    let composer = PostComposer::new(&session, &config.selectors);
    let result = composer.fill_body("본문").await;
    assert!(matches!(result, Err(Error::FieldNotFound(_))));

    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver"]
async fn test_batch_records_one_outcome_per_file_and_keeps_one_window() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let mut files: Vec<PathBuf> = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("article_{i}.txt"));
        std::fs::write(
            &path,
            format!(
                "제목: 글 {i}\nmeta\n==================================================\n\n본문 {i}"
            ),
        )
        .expect("write article");
        files.push(path);
    }

    let config = test_config();
    let session = provision(&config).await;
    // a page with no write button: every item fails, none may abort the batch
    session
        .navigate("data:text/html,<p>no write button here</p>")
        .await
        .expect("Failed to navigate");

    let runner = BatchRunner::new(&session, &config.selectors);
    let run = runner.run(&files, None, &LogProgress).await;

    assert_eq!(run.total(), 3);
    assert_eq!(run.succeeded(), 0);
    for item in &run.items {
        assert!(!item.outcome.is_success());
    }

    // one-window invariant holds even across failed items
    assert_eq!(session.window_count().await.expect("window count"), 1);

    session.teardown().await;
}

#[tokio::test]
#[ignore = "requires chromedriver and network access"]
async fn test_open_login_entry() {
    if !chromedriver_available() {
        eprintln!("chromedriver not found, skipping test");
        return;
    }

    let config = test_config();
    let session = provision(&config).await;
    tistory_runner::auth::open_login_entry(&session)
        .await
        .expect("Failed to open login page");
    session.teardown().await;
}
