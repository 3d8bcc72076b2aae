//! Field injection into the active editor.

use crate::config::Selectors;
use crate::{Error, Result, Session};
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// The two body-input surfaces the write page can present. Selection is
/// first-found rather than a platform-version flag: whichever surface
/// resolves is the one written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorSurface {
    /// Script-addressable CodeMirror surface (markdown mode). Populated by
    /// direct script injection — keystroke simulation does not reliably
    /// land in this widget.
    Code,
    /// Legacy rich-text surface hosted in a named iframe.
    FrameHosted,
}

impl EditorSurface {
    /// Resolve whichever surface the current page presents, if any. The
    /// CodeMirror widget renders some time after the mode switch is
    /// confirmed, so both probes repeat within the element wait rather
    /// than deciding on one look.
    pub async fn resolve(session: &Session, selectors: &Selectors) -> Result<Option<Self>> {
        let deadline = Instant::now() + session.waits().element();
        loop {
            if let Some(surface) = Self::probe(session, selectors).await? {
                return Ok(Some(surface));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(session.waits().poll()).await;
        }
    }

    async fn probe(session: &Session, selectors: &Selectors) -> Result<Option<Self>> {
        let probe = format!(
            "return !!document.querySelector({});",
            js_string(&selectors.code_surface)
        );
        if session.eval::<bool>(&probe).await.unwrap_or(false) {
            debug!("resolved code surface '{}'", selectors.code_surface);
            return Ok(Some(Self::Code));
        }
        if !session.find_all(&selectors.rich_text_frame).await?.is_empty() {
            debug!("resolved frame-hosted surface '{}'", selectors.rich_text_frame);
            return Ok(Some(Self::FrameHosted));
        }
        Ok(None)
    }

    /// Write `body` into this surface.
    pub async fn write(&self, session: &Session, selectors: &Selectors, body: &str) -> Result<()> {
        match self {
            Self::Code => {
                let script = format!(
                    "document.querySelector({}).innerText = arguments[0];",
                    js_string(&selectors.code_surface)
                );
                session.run_script(&script, vec![json!(body)]).await
            }
            Self::FrameHosted => {
                session.enter_frame(&selectors.rich_text_frame).await?;
                let result = Self::write_into_frame(session, selectors, body).await;
                // restore the frame context even when the write failed
                if let Err(e) = session.enter_default_frame().await {
                    warn!("failed to leave editor frame: {}", e);
                }
                result
            }
        }
    }

    async fn write_into_frame(
        session: &Session,
        selectors: &Selectors,
        body: &str,
    ) -> Result<()> {
        let root = session
            .await_element(&selectors.rich_text_root, session.waits().element())
            .await
            .map_err(|_| {
                Error::FieldNotFound(format!(
                    "rich text root '{}'",
                    selectors.rich_text_root
                ))
            })?;
        if let Err(e) = root.clear().await {
            debug!("clear on rich text root failed: {}", e);
        }
        root.send_keys(body).await?;
        Ok(())
    }
}

/// Injects title and body into the write page.
pub struct PostComposer<'a> {
    session: &'a Session,
    selectors: &'a Selectors,
}

impl<'a> PostComposer<'a> {
    pub fn new(session: &'a Session, selectors: &'a Selectors) -> Self {
        Self { session, selectors }
    }

    /// Locate the title field, clear it, set the title.
    pub async fn fill_title(&self, title: &str) -> Result<()> {
        let field = self
            .session
            .await_element(&self.selectors.title_input, self.session.waits().element())
            .await
            .map_err(|_| {
                Error::FieldNotFound(format!("title input '{}'", self.selectors.title_input))
            })?;
        field.clear().await?;
        field.send_keys(title).await?;
        info!("title set");
        Ok(())
    }

    /// Write the body into whichever editor surface resolves. The body is
    /// copied to the clipboard first as a manual-paste fallback; clipboard
    /// failure is logged and never affects the outcome.
    pub async fn fill_body(&self, body: &str) -> Result<()> {
        self.copy_to_clipboard(body).await;

        let surface = EditorSurface::resolve(self.session, self.selectors).await?;
        let Some(surface) = surface else {
            return Err(Error::FieldNotFound(format!(
                "no editor surface: neither '{}' nor '{}' present",
                self.selectors.code_surface, self.selectors.rich_text_frame
            )));
        };
        surface.write(self.session, self.selectors, body).await?;
        info!("body written via {:?} surface", surface);
        Ok(())
    }

    async fn copy_to_clipboard(&self, body: &str) {
        // writeText resolves asynchronously; wait for the promise so a
        // rejected write does not get logged as a successful copy
        let script = "const done = arguments[arguments.length - 1]; \
                      navigator.clipboard.writeText(arguments[0])\
                          .then(() => done(null), (e) => done(String(e)));";
        match self
            .session
            .run_script_async(script, vec![json!(body)])
            .await
        {
            Ok(Value::Null) => debug!("body copied to clipboard"),
            Ok(reason) => warn!("clipboard copy rejected (manual paste unavailable): {}", reason),
            Err(e) => warn!("clipboard copy failed (manual paste unavailable): {}", e),
        }
    }
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).expect("strings serialize to json")
}
