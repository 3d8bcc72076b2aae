//! Write-page acquisition state machine.
//!
//! Takes a logged-in landing page to "write page open, markdown mode
//! active". The platform nondeterministically raises a native confirmation
//! dialog when switching editor modes, and a native dialog blocks every
//! other driver command until handled — so each transition that can trigger
//! one probes for it with a bounded number of attempts before proceeding.

use crate::config::{Selectors, WaitConfig};
use crate::{Error, Result, Session};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Navigation states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    WriteButtonSought,
    NewWindowAttached,
    ModeMenuOpened,
    MarkdownModeConfirmed,
    Ready,
}

pub struct EditorNavigator<'a> {
    session: &'a Session,
    selectors: &'a Selectors,
    state: NavState,
}

impl<'a> EditorNavigator<'a> {
    pub fn new(session: &'a Session, selectors: &'a Selectors) -> Self {
        Self {
            session,
            selectors,
            state: NavState::Idle,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    fn transition(&mut self, next: NavState) {
        debug!("navigator: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Drive the full sequence: write button -> new window -> markdown
    /// mode. On success the session is focused on the write page with the
    /// markdown editor active.
    pub async fn open_markdown_editor(&mut self) -> Result<()> {
        let waits = self.session.waits();

        self.transition(NavState::WriteButtonSought);
        let buttons = self
            .session
            .await_all(&self.selectors.write_button, waits.element())
            .await?;
        let Some(write_button) = buttons.first() else {
            return Err(Error::WriteButtonMissing);
        };

        // the write page opens in a new window; count handles before the
        // click so the attach wait has a baseline
        let initial_windows = self.session.window_count().await?;
        info!("opening write page");
        write_button.click().await?;
        self.session
            .wait_for_new_window(initial_windows, waits.window())
            .await?;
        self.session.switch_to_newest_window().await?;
        self.transition(NavState::NewWindowAttached);

        // some platform states raise a draft-restore dialog right here
        if self.session.dismiss_alert_if_present(waits.alert()).await {
            debug!("dismissed dialog on write page open");
        }

        let mode_menu = self
            .session
            .await_clickable(&self.selectors.mode_menu_button, waits.clickable())
            .await
            .map_err(|_| {
                Error::FieldNotFound(format!(
                    "editor mode menu '{}'",
                    self.selectors.mode_menu_button
                ))
            })?;
        mode_menu.click().await?;
        self.transition(NavState::ModeMenuOpened);

        let markdown_item = self
            .session
            .await_clickable(&self.selectors.markdown_mode_item, waits.clickable())
            .await
            .map_err(|_| {
                Error::FieldNotFound(format!(
                    "markdown mode entry '{}'",
                    self.selectors.markdown_mode_item
                ))
            })?;
        markdown_item.click().await?;

        // the mode-switch confirmation dialog shows up with variable
        // latency; several short probes with a pause between them, the
        // whole round staying within one alert wait
        let window = probe_window(waits);
        let mut confirmed = false;
        for attempt in 1..=waits.alert_retries {
            if self.session.accept_alert_if_present(window).await {
                debug!("mode switch confirmed on probe {}", attempt);
                confirmed = true;
                break;
            }
            if attempt < waits.alert_retries {
                sleep(waits.poll()).await;
            }
        }
        if !confirmed {
            debug!("no mode-switch dialog appeared");
        }
        self.transition(NavState::MarkdownModeConfirmed);

        self.transition(NavState::Ready);
        Ok(())
    }
}

impl std::fmt::Debug for EditorNavigator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorNavigator")
            .field("state", &self.state)
            .finish()
    }
}

/// Per-probe share of the alert window. The post-mode-switch retries
/// together stay within a single configured alert wait.
fn probe_window(waits: &WaitConfig) -> Duration {
    waits.alert() / waits.alert_retries.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_round_stays_within_one_alert_wait() {
        let waits = WaitConfig::default();
        let window = probe_window(&waits);
        assert!(window * waits.alert_retries <= waits.alert());
    }

    #[test]
    fn test_probe_window_survives_zero_retries() {
        let waits = WaitConfig {
            alert_retries: 0,
            ..WaitConfig::default()
        };
        assert_eq!(probe_window(&waits), waits.alert());
    }
}
