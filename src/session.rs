//! Browser session ownership.
//!
//! All window-handle and frame-context mutation lives here. No other module
//! touches driver focus state directly, so two components can never disagree
//! about which window or frame is current.

use crate::config::{BrowserConfig, WaitConfig};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use thirtyfour::extensions::query::ElementQueryable;
use thirtyfour::{
    By, ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WebElement,
    WindowHandle,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const SPAWN_CONNECT_ATTEMPTS: u32 = 20;
const SPAWN_CONNECT_DELAY: Duration = Duration::from_millis(250);

/// One controllable browser instance.
///
/// Owned by the long-lived caller, not by any single batch run; a run
/// borrows it and must not tear it down.
pub struct Session {
    driver: WebDriver,
    waits: WaitConfig,
    // chromedriver child, when we spawned it ourselves
    driver_process: Option<Child>,
}

impl Session {
    /// Provision a controllable browser.
    ///
    /// Tries, in order: (a) a WebDriver endpoint already listening at the
    /// configured URL, (b) spawning `chromedriver` from PATH on that URL's
    /// port. Exhausting both is fatal for the run and is surfaced with
    /// remediation guidance, not retried.
    pub async fn provision(config: &BrowserConfig, waits: &WaitConfig) -> Result<Self> {
        match WebDriver::new(&config.webdriver_url, build_caps(config)?).await {
            Ok(driver) => {
                info!("connected to webdriver at {}", config.webdriver_url);
                return Ok(Self {
                    driver,
                    waits: waits.clone(),
                    driver_process: None,
                });
            }
            Err(e) => {
                debug!("no webdriver at {}: {}", config.webdriver_url, e);
            }
        }

        let port = endpoint_port(&config.webdriver_url);
        let mut child = Command::new("chromedriver")
            .arg(format!("--port={port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::BrowserUnavailable(format!(
                    "no webdriver endpoint at {} and chromedriver is not on PATH ({}). \
                     Install Chrome and a matching chromedriver: https://www.google.com/chrome/",
                    config.webdriver_url, e
                ))
            })?;
        info!("spawned chromedriver on port {}", port);

        for attempt in 1..=SPAWN_CONNECT_ATTEMPTS {
            sleep(SPAWN_CONNECT_DELAY).await;
            match WebDriver::new(&config.webdriver_url, build_caps(config)?).await {
                Ok(driver) => {
                    return Ok(Self {
                        driver,
                        waits: waits.clone(),
                        driver_process: Some(child),
                    });
                }
                Err(e) if attempt == SPAWN_CONNECT_ATTEMPTS => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::BrowserUnavailable(format!(
                        "chromedriver started but no session could be created: {}. \
                         Check that an up-to-date Chrome is installed",
                        e
                    )));
                }
                Err(e) => debug!("session attempt {}/{}: {}", attempt, SPAWN_CONNECT_ATTEMPTS, e),
            }
        }
        unreachable!("connect loop returns on the last attempt");
    }

    pub fn waits(&self) -> &WaitConfig {
        &self.waits
    }

    /// Navigate the current window.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    /// Wait for an element to be present, up to `timeout`.
    pub async fn await_element(&self, selector: &str, timeout: Duration) -> Result<WebElement> {
        let elem = self
            .driver
            .query(By::Css(selector))
            .wait(timeout, self.waits.poll())
            .first()
            .await?;
        Ok(elem)
    }

    /// Wait for an element to be present and clickable, up to `timeout`.
    pub async fn await_clickable(&self, selector: &str, timeout: Duration) -> Result<WebElement> {
        let elem = self
            .driver
            .query(By::Css(selector))
            .wait(timeout, self.waits.poll())
            .and_clickable()
            .first()
            .await?;
        Ok(elem)
    }

    /// Wait until at least one element matches, up to `timeout`. Returns an
    /// empty vec on timeout instead of an error; the caller decides what an
    /// empty group means.
    pub async fn await_all(&self, selector: &str, timeout: Duration) -> Result<Vec<WebElement>> {
        let deadline = Instant::now() + timeout;
        loop {
            let found = self.driver.find_all(By::Css(selector)).await?;
            if !found.is_empty() || Instant::now() >= deadline {
                return Ok(found);
            }
            sleep(self.waits.poll()).await;
        }
    }

    /// All elements matching `selector`, without waiting.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<WebElement>> {
        Ok(self.driver.find_all(By::Css(selector)).await?)
    }

    /// Number of open window handles.
    pub async fn window_count(&self) -> Result<usize> {
        Ok(self.driver.windows().await?.len())
    }

    /// Handle of the currently focused window.
    pub async fn current_window(&self) -> Result<WindowHandle> {
        Ok(self.driver.window().await?)
    }

    /// Wait until the handle count exceeds `initial`, up to `timeout`.
    pub async fn wait_for_new_window(&self, initial: usize, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.driver.windows().await?.len() > initial {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::WindowAttachTimeout);
            }
            sleep(self.waits.poll()).await;
        }
    }

    /// Focus the most recently opened window. The frame context is reset
    /// first: a window switch with a stale frame context corrupts focus.
    pub async fn switch_to_newest_window(&self) -> Result<()> {
        let _ = self.driver.enter_default_frame().await;
        let handles = self.driver.windows().await?;
        let newest = handles
            .last()
            .cloned()
            .ok_or_else(|| Error::Navigation("no open browser windows".into()))?;
        self.driver.switch_to_window(newest).await?;
        Ok(())
    }

    /// Focus the given window, resetting the frame context first.
    pub async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let _ = self.driver.enter_default_frame().await;
        self.driver.switch_to_window(handle.clone()).await?;
        Ok(())
    }

    /// Close every window except `base` and focus `base` again. Leaves the
    /// session with exactly one open window regardless of what the current
    /// item left behind.
    pub async fn close_extra_windows(&self, base: &WindowHandle) -> Result<()> {
        let _ = self.driver.enter_default_frame().await;
        for handle in self.driver.windows().await? {
            if handle != *base {
                self.driver.switch_to_window(handle).await?;
                self.driver.close_window().await?;
            }
        }
        self.driver.switch_to_window(base.clone()).await?;
        Ok(())
    }

    /// Switch the frame context to the iframe matched by `selector`.
    pub async fn enter_frame(&self, selector: &str) -> Result<()> {
        let frame = self.await_element(selector, self.waits.element()).await?;
        frame.enter_frame().await?;
        Ok(())
    }

    /// Reset the frame context to the top-level document.
    pub async fn enter_default_frame(&self) -> Result<()> {
        self.driver.enter_default_frame().await?;
        Ok(())
    }

    /// Probe for a native alert and dismiss it. Absence within the timeout
    /// is a normal outcome — returns whether an alert was dismissed.
    pub async fn dismiss_alert_if_present(&self, timeout: Duration) -> bool {
        self.probe_alert(timeout, false).await
    }

    /// Probe for a native alert and accept it.
    pub async fn accept_alert_if_present(&self, timeout: Duration) -> bool {
        self.probe_alert(timeout, true).await
    }

    async fn probe_alert(&self, timeout: Duration, accept: bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let result = if accept {
                self.driver.accept_alert().await
            } else {
                self.driver.dismiss_alert().await
            };
            match result {
                Ok(()) => {
                    debug!("alert {}", if accept { "accepted" } else { "dismissed" });
                    return true;
                }
                Err(_) if Instant::now() < deadline => sleep(self.waits.poll()).await,
                Err(_) => return false,
            }
        }
    }

    /// Run a script in the current frame, discarding the return value.
    pub async fn run_script(&self, script: &str, args: Vec<serde_json::Value>) -> Result<()> {
        self.driver.execute(script, args).await?;
        Ok(())
    }

    /// Run an async script. The driver appends a completion callback to the
    /// argument list; whatever the page passes to it is returned.
    pub async fn run_script_async(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let ret = self.driver.execute_async(script, args).await?;
        Ok(ret.json().clone())
    }

    /// Run a script and deserialize its return value.
    pub async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let ret = self.driver.execute(script, Vec::new()).await?;
        Ok(ret.convert()?)
    }

    /// Quit the browser and reap the spawned chromedriver, if any.
    pub async fn teardown(self) {
        let Session {
            driver,
            driver_process,
            ..
        } = self;
        if let Err(e) = driver.quit().await {
            warn!("browser quit failed: {}", e);
        }
        if let Some(mut child) = driver_process {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn build_caps(config: &BrowserConfig) -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    for arg in &config.chrome_args {
        caps.add_arg(arg)?;
    }
    if config.headless {
        caps.set_headless()?;
    }
    Ok(caps)
}

fn endpoint_port(url: &str) -> u16 {
    url.rsplit(':')
        .next()
        .map(|p| p.trim_end_matches('/'))
        .and_then(|p| p.parse().ok())
        .unwrap_or(9515)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_port_parses_trailing_port() {
        assert_eq!(endpoint_port("http://localhost:9515"), 9515);
        assert_eq!(endpoint_port("http://127.0.0.1:4444/"), 4444);
    }

    #[test]
    fn endpoint_port_falls_back_to_default() {
        assert_eq!(endpoint_port("http://localhost"), 9515);
    }
}
