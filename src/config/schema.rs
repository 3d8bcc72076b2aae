use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level runner configuration, loaded from YAML.
///
/// Every section has defaults matching the Tistory markup observed at the
/// time of writing, so an empty file (or no file at all) is a valid config.
/// Sites change their markup without notice; the selector profile exists so
/// a new markup version is a config edit, not a code change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub waits: WaitConfig,

    #[serde(default)]
    pub selectors: Selectors,
}

impl RunnerConfig {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: RunnerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in self.selectors.entries() {
            if value.is_empty() {
                return Err(Error::Config(format!(
                    "selectors.{} must not be empty",
                    name
                )));
            }
        }
        if self.waits.poll_ms == 0 {
            return Err(Error::Config("waits.poll_ms must be at least 1".into()));
        }
        if self.browser.webdriver_url.is_empty() {
            return Err(Error::Config("browser.webdriver_url must not be empty".into()));
        }
        Ok(())
    }
}

/// Browser provisioning configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint. Connected to directly if a driver is already
    /// listening there; otherwise a chromedriver from PATH is spawned on
    /// the same port.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run Chrome headless. Off by default: the human has to log in
    /// through the visible window.
    #[serde(default)]
    pub headless: bool,

    /// Chrome launch arguments.
    #[serde(default = "default_chrome_args")]
    pub chrome_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: false,
            chrome_args: default_chrome_args(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}

fn default_chrome_args() -> Vec<String> {
    [
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--disable-extensions",
        "--disable-plugins",
        "--disable-background-timer-throttling",
        "--disable-backgrounding-occluded-windows",
        "--disable-renderer-backgrounding",
        "--disable-features=TranslateUI",
        "--memory-pressure-off",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Bounded-wait settings. Every wait in the automation is bounded; there is
/// no unbounded polling anywhere.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitConfig {
    /// Wait for an element to be present.
    #[serde(default = "default_element_secs")]
    pub element_secs: u64,

    /// Wait for an element to be clickable.
    #[serde(default = "default_clickable_secs")]
    pub clickable_secs: u64,

    /// Alert wait. Single probes use it whole; the post-mode-switch probe
    /// round splits it across `alert_retries`. Absence of an alert within
    /// the window is a normal outcome, not an error.
    #[serde(default = "default_alert_secs")]
    pub alert_secs: u64,

    /// Number of alert probes after the editor-mode switch. The
    /// confirmation dialog appears with variable latency there.
    #[serde(default = "default_alert_retries")]
    pub alert_retries: u32,

    /// Wait for a new window handle to appear after the write-button click.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Poll interval for all of the above.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            element_secs: default_element_secs(),
            clickable_secs: default_clickable_secs(),
            alert_secs: default_alert_secs(),
            alert_retries: default_alert_retries(),
            window_secs: default_window_secs(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl WaitConfig {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn clickable(&self) -> Duration {
        Duration::from_secs(self.clickable_secs)
    }

    pub fn alert(&self) -> Duration {
        Duration::from_secs(self.alert_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

fn default_element_secs() -> u64 {
    10
}

fn default_clickable_secs() -> u64 {
    5
}

fn default_alert_secs() -> u64 {
    3
}

fn default_alert_retries() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    10
}

fn default_poll_ms() -> u64 {
    250
}

/// Selector profile for the Tistory editor markup.
///
/// The defaults are the most complete variant observed; override individual
/// entries in YAML when the site ships a markup revision.
#[derive(Debug, Clone, Deserialize)]
pub struct Selectors {
    /// Write/tab link group on the logged-in landing page. The first
    /// element of the group is the write button.
    #[serde(default = "default_write_button")]
    pub write_button: String,

    /// Title input on the write page.
    #[serde(default = "default_title_input")]
    pub title_input: String,

    /// Editor-mode dropdown trigger.
    #[serde(default = "default_mode_menu_button")]
    pub mode_menu_button: String,

    /// Markdown entry in the editor-mode dropdown.
    #[serde(default = "default_markdown_mode_item")]
    pub markdown_mode_item: String,

    /// Script-addressable markdown code surface.
    #[serde(default = "default_code_surface")]
    pub code_surface: String,

    /// Legacy rich-text editor iframe.
    #[serde(default = "default_rich_text_frame")]
    pub rich_text_frame: String,

    /// Content root inside the rich-text iframe.
    #[serde(default = "default_rich_text_root")]
    pub rich_text_root: String,

    /// Completion/review button that opens the confirmation panel.
    #[serde(default = "default_completion_button")]
    pub completion_button: String,

    /// Setting rows inside the confirmation panel.
    #[serde(default = "default_panel_items")]
    pub panel_items: String,

    /// "Public" visibility radio inside the panel.
    #[serde(default = "default_public_radio")]
    pub public_radio: String,

    /// Reserve (scheduled publish) toggle, in its unselected state.
    #[serde(default = "default_reserve_toggle")]
    pub reserve_toggle: String,

    /// Scheduled-date display element.
    #[serde(default = "default_date_display")]
    pub date_display: String,

    /// Scheduled-hour input.
    #[serde(default = "default_hour_input")]
    pub hour_input: String,

    /// Scheduled-minute input.
    #[serde(default = "default_minute_input")]
    pub minute_input: String,

    /// Final publish-confirmation button.
    #[serde(default = "default_publish_button")]
    pub publish_button: String,
}

impl Selectors {
    /// Named view of all entries, used by validation.
    fn entries(&self) -> [(&'static str, &str); 15] {
        [
            ("write_button", &self.write_button),
            ("title_input", &self.title_input),
            ("mode_menu_button", &self.mode_menu_button),
            ("markdown_mode_item", &self.markdown_mode_item),
            ("code_surface", &self.code_surface),
            ("rich_text_frame", &self.rich_text_frame),
            ("rich_text_root", &self.rich_text_root),
            ("completion_button", &self.completion_button),
            ("panel_items", &self.panel_items),
            ("public_radio", &self.public_radio),
            ("reserve_toggle", &self.reserve_toggle),
            ("date_display", &self.date_display),
            ("hour_input", &self.hour_input),
            ("minute_input", &self.minute_input),
            ("publish_button", &self.publish_button),
        ]
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            write_button: default_write_button(),
            title_input: default_title_input(),
            mode_menu_button: default_mode_menu_button(),
            markdown_mode_item: default_markdown_mode_item(),
            code_surface: default_code_surface(),
            rich_text_frame: default_rich_text_frame(),
            rich_text_root: default_rich_text_root(),
            completion_button: default_completion_button(),
            panel_items: default_panel_items(),
            public_radio: default_public_radio(),
            reserve_toggle: default_reserve_toggle(),
            date_display: default_date_display(),
            hour_input: default_hour_input(),
            minute_input: default_minute_input(),
            publish_button: default_publish_button(),
        }
    }
}

fn default_write_button() -> String {
    ".wrap_link .link_tab".into()
}

fn default_title_input() -> String {
    "#post-title-inp".into()
}

fn default_mode_menu_button() -> String {
    "#editor-mode-layer-btn-open".into()
}

fn default_markdown_mode_item() -> String {
    "#editor-mode-markdown-text".into()
}

fn default_code_surface() -> String {
    "#markdown-editor-container .CodeMirror-code".into()
}

fn default_rich_text_frame() -> String {
    "#editor-tistory_ifr".into()
}

fn default_rich_text_root() -> String {
    "#tinymce".into()
}

fn default_completion_button() -> String {
    "#publish-layer-btn".into()
}

fn default_panel_items() -> String {
    ".info_editor.info_editor_type2 .inp_item".into()
}

fn default_public_radio() -> String {
    "#open20".into()
}

fn default_reserve_toggle() -> String {
    ".info_editor.info_editor_type2 .btn_date:not(.on)".into()
}

fn default_date_display() -> String {
    ".btn_reserve".into()
}

fn default_hour_input() -> String {
    "#dateHour".into()
}

fn default_minute_input() -> String {
    "#dateMinute".into()
}

fn default_publish_button() -> String {
    "#publish-btn".into()
}
