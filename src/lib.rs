//! # tistory-runner
//!
//! Browser automation for batch-publishing articles through the Tistory
//! editor, which has no public write API. A real browser is driven through
//! login, write-page navigation, an editor-mode switch, field injection and
//! the publish sequence, for a batch of pre-generated article files.
//!
//! The human performs the actual login in the visible browser window; the
//! runner only opens the login page and takes over once a session exists.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tistory_runner::{BatchRunner, LogProgress, RunnerConfig, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> tistory_runner::Result<()> {
//! let config = RunnerConfig::default();
//! let session = Session::provision(&config.browser, &config.waits).await?;
//! tistory_runner::auth::open_login_entry(&session).await?;
//! // ... wait for the human to log in ...
//! let runner = BatchRunner::new(&session, &config.selectors);
//! let files = vec!["article.txt".into()];
//! let run = runner.run(&files, None, &LogProgress).await;
//! println!("{}/{} succeeded", run.succeeded(), run.total());
//! session.teardown().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;

mod article;
mod batch;
mod config;
mod editor;
mod session;

pub use api::{BlogPost, GeminiClient, NaverSearchClient};
pub use article::{ArticleFile, PublishSchedule};
pub use batch::{BatchItem, BatchRun, BatchRunner, LogProgress, Outcome, ProgressSink};
pub use config::{BrowserConfig, RunnerConfig, Selectors, Settings, WaitConfig};
pub use editor::{
    EditorNavigator, EditorSurface, NavState, PostComposer, PublishOutcome, PublishSequencer,
};
pub use session::Session;

/// Result type for tistory-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during configuration, provisioning or automation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No controllable browser could be provisioned. Fatal for the run.
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    /// The login entry page failed to load.
    #[error("navigation error: {0}")]
    Navigation(String),

    /// The write button was absent after the bounded wait.
    #[error("write button not found on the current page")]
    WriteButtonMissing,

    /// The write page never opened a new window within the wait window.
    #[error("timed out waiting for the write page window to open")]
    WindowAttachTimeout,

    /// An editor field could not be located.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("publish error: {0}")]
    Publish(String),

    /// Schedule input failed validation.
    #[error("schedule error: {0}")]
    Schedule(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = RunnerConfig::parse("{}").unwrap();
        assert_eq!(config.selectors.write_button, ".wrap_link .link_tab");
        assert_eq!(config.selectors.title_input, "#post-title-inp");
        assert_eq!(config.selectors.publish_button, "#publish-btn");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
        assert_eq!(config.waits.element_secs, 10);
        assert_eq!(config.waits.alert_retries, 3);
    }

    #[test]
    fn test_parse_browser_config() {
        let yaml = r#"
browser:
  headless: true
  webdriver_url: "http://localhost:4444"
  chrome_args: ["--no-sandbox"]
"#;
        let config = RunnerConfig::parse(yaml).unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.browser.chrome_args, vec!["--no-sandbox"]);
    }

    #[test]
    fn test_parse_selector_overrides() {
        let yaml = r##"
selectors:
  write_button: ".new-markup .write-link"
  publish_button: "#confirm-publish"
"##;
        let config = RunnerConfig::parse(yaml).unwrap();
        assert_eq!(config.selectors.write_button, ".new-markup .write-link");
        assert_eq!(config.selectors.publish_button, "#confirm-publish");
        // untouched entries keep the default profile
        assert_eq!(config.selectors.title_input, "#post-title-inp");
    }

    #[test]
    fn test_parse_wait_overrides() {
        let yaml = r#"
waits:
  element_secs: 20
  alert_secs: 1
  poll_ms: 100
"#;
        let config = RunnerConfig::parse(yaml).unwrap();
        assert_eq!(config.waits.element_secs, 20);
        assert_eq!(config.waits.alert_secs, 1);
        assert_eq!(config.waits.poll_ms, 100);
        assert_eq!(config.waits.window_secs, 10); // default
    }

    #[test]
    fn test_validation_empty_selector() {
        let yaml = r#"
selectors:
  title_input: ""
"#;
        let result = RunnerConfig::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("title_input"));
    }

    #[test]
    fn test_validation_zero_poll_interval() {
        let yaml = r#"
waits:
  poll_ms: 0
"#;
        let result = RunnerConfig::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("poll_ms"));
    }

    #[test]
    fn test_api_clients_exported_at_crate_root() {
        // the binary imports these from the root alongside the driver types
        let _naver = crate::NaverSearchClient::new("id", "secret");
        let _gemini = crate::GeminiClient::new("key");
    }

    #[test]
    fn test_load_default_profile() {
        let config = RunnerConfig::load("configs/tistory.yaml").unwrap();
        assert_eq!(config.selectors.markdown_mode_item, "#editor-mode-markdown-text");
        assert_eq!(config.selectors.hour_input, "#dateHour");
    }
}
