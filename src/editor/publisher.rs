//! Multi-stage publish confirmation.
//!
//! Steps in order: completion button, public-visibility radio, scheduled
//! date fields, schedule-enable button, final publish button. Visibility
//! and scheduling are best effort — a missing control there is logged and
//! the sequence continues to the best remaining state. Only the completion
//! and final publish buttons are load-bearing: when either is missing the
//! composed draft is left open for the human, which is a terminal outcome
//! of its own, not a retried failure.

use crate::article::PublishSchedule;
use crate::config::Selectors;
use crate::{Result, Session};
use serde_json::json;
use thirtyfour::By;
use tracing::{debug, info, warn};

/// Terminal outcome of the publish sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The final publish button was clicked.
    Published,
    /// Content is entered but final publish could not be automated; a
    /// human completes the action in the open window.
    PreparedManual,
}

pub struct PublishSequencer<'a> {
    session: &'a Session,
    selectors: &'a Selectors,
}

impl<'a> PublishSequencer<'a> {
    pub fn new(session: &'a Session, selectors: &'a Selectors) -> Self {
        Self { session, selectors }
    }

    /// Drive the confirmation panel to publication. A schedule, when
    /// present, is already validated — `PublishSchedule` cannot hold a
    /// malformed date — so no input check happens this deep.
    pub async fn confirm_and_publish(
        &self,
        schedule: Option<&PublishSchedule>,
    ) -> Result<PublishOutcome> {
        let waits = self.session.waits();

        let Ok(completion) = self
            .session
            .await_clickable(&self.selectors.completion_button, waits.clickable())
            .await
        else {
            warn!(
                "completion button '{}' not found; draft left open for manual publish",
                self.selectors.completion_button
            );
            return Ok(PublishOutcome::PreparedManual);
        };
        completion.click().await?;
        debug!("confirmation panel opened");

        match self
            .session
            .await_clickable(&self.selectors.public_radio, waits.clickable())
            .await
        {
            Ok(radio) => {
                if let Err(e) = radio.click().await {
                    warn!("public visibility click failed: {}", e);
                } else {
                    debug!("visibility set to public");
                }
            }
            Err(_) => warn!(
                "visibility control '{}' not found, continuing",
                self.selectors.public_radio
            ),
        }

        if let Some(schedule) = schedule {
            self.apply_schedule(schedule).await;
        }

        let Ok(publish) = self
            .session
            .await_clickable(&self.selectors.publish_button, waits.clickable())
            .await
        else {
            warn!(
                "publish button '{}' not found; draft left open for manual publish",
                self.selectors.publish_button
            );
            return Ok(PublishOutcome::PreparedManual);
        };
        publish.click().await?;
        info!("publish confirmed");
        Ok(PublishOutcome::Published)
    }

    /// Fill the scheduled date/hour/minute and enable scheduling. Every
    /// step here is best effort; a missing control never blocks the final
    /// publish attempt.
    async fn apply_schedule(&self, schedule: &PublishSchedule) {
        let waits = self.session.waits();

        match self
            .session
            .await_clickable(&self.selectors.reserve_toggle, waits.clickable())
            .await
        {
            Ok(toggle) => {
                if let Err(e) = toggle.click().await {
                    warn!("reserve toggle click failed: {}", e);
                }
            }
            Err(_) => warn!(
                "reserve toggle '{}' not found, continuing",
                self.selectors.reserve_toggle
            ),
        }

        // date is shown as text, hour/minute are value inputs
        self.inject(&self.selectors.date_display, "innerText", &schedule.date_string())
            .await;
        self.inject(&self.selectors.hour_input, "value", &schedule.hour().to_string())
            .await;
        self.inject(
            &self.selectors.minute_input,
            "value",
            &schedule.minute().to_string(),
        )
        .await;

        self.click_schedule_enable().await;

        info!(
            "schedule applied: {} {:02}:{:02}",
            schedule.date_string(),
            schedule.hour(),
            schedule.minute()
        );
    }

    /// Set a property on the first element matching `selector` by script.
    async fn inject(&self, selector: &str, property: &str, value: &str) {
        let element = match self
            .session
            .await_element(selector, self.session.waits().clickable())
            .await
        {
            Ok(el) => el,
            Err(_) => {
                warn!("schedule field '{}' not found, continuing", selector);
                return;
            }
        };
        let script = format!("arguments[0].{} = arguments[1];", property);
        let args = match element.to_json() {
            Ok(el_ref) => vec![el_ref, json!(value)],
            Err(e) => {
                warn!("schedule field '{}' not scriptable: {}", selector, e);
                return;
            }
        };
        if let Err(e) = self.session.run_script(&script, args).await {
            warn!("schedule field '{}' injection failed: {}", selector, e);
        }
    }

    /// The schedule-enable button is the second button of the third panel
    /// row; the panel carries no stable id for it.
    async fn click_schedule_enable(&self) {
        let items = match self.session.find_all(&self.selectors.panel_items).await {
            Ok(items) => items,
            Err(e) => {
                warn!("confirmation panel rows not readable: {}", e);
                return;
            }
        };
        let Some(date_row) = items.get(2) else {
            warn!("confirmation panel has no schedule row, continuing");
            return;
        };
        match date_row.find_all(By::Tag("button")).await {
            Ok(buttons) if buttons.len() >= 2 => {
                if let Err(e) = buttons[1].click().await {
                    warn!("schedule enable click failed: {}", e);
                }
            }
            Ok(_) => warn!("schedule row has no enable button, continuing"),
            Err(e) => warn!("schedule row not readable: {}", e),
        }
    }
}
