//! Continue-on-error batch loop.
//!
//! Items run strictly one at a time against the single shared session:
//! concurrent steps would race on window and frame focus. Each item opens
//! its own write window and has it closed again before the next item
//! starts, so exactly one window remains on the base handle between items.

use crate::article::{ArticleFile, PublishSchedule};
use crate::config::Selectors;
use crate::editor::{EditorNavigator, PostComposer, PublishOutcome, PublishSequencer};
use crate::{Result, Session};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Terminal outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Automated publish completed.
    Published,
    /// Content entered, final publish left to the human.
    PreparedManualFallback,
    /// The item failed; the reason is human-readable.
    Failed(String),
}

impl Outcome {
    /// Published and prepared-manual both count as success: in either case
    /// the content reached the editor.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }
}

/// One article file paired with its terminal outcome.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub source: PathBuf,
    pub title: String,
    pub outcome: Outcome,
}

/// Ordered outcomes of one batch invocation.
#[derive(Debug, Default)]
pub struct BatchRun {
    pub items: Vec<BatchItem>,
}

impl BatchRun {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// Progress interface for the embedding UI. Called once per completed item
/// and once at the end of the batch.
pub trait ProgressSink: Send + Sync {
    fn item_completed(&self, completed: usize, total: usize, item: &BatchItem);
    fn batch_completed(&self, run: &BatchRun);
}

/// Progress sink that reports through tracing.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn item_completed(&self, completed: usize, total: usize, item: &BatchItem) {
        match &item.outcome {
            Outcome::Published => info!("[{}/{}] {} - published", completed, total, item.title),
            Outcome::PreparedManualFallback => info!(
                "[{}/{}] {} - prepared, finish publishing manually",
                completed, total, item.title
            ),
            Outcome::Failed(reason) => {
                warn!("[{}/{}] {} - failed: {}", completed, total, item.title, reason)
            }
        }
    }

    fn batch_completed(&self, run: &BatchRun) {
        info!("batch finished: {}/{} succeeded", run.succeeded(), run.total());
    }
}

/// Runs a list of article files through navigate -> compose -> publish,
/// one at a time, never aborting on a per-item failure.
pub struct BatchRunner<'a> {
    session: &'a Session,
    selectors: &'a Selectors,
}

impl<'a> BatchRunner<'a> {
    pub fn new(session: &'a Session, selectors: &'a Selectors) -> Self {
        Self { session, selectors }
    }

    /// Process every file in order. Each input file yields exactly one
    /// recorded outcome; errors below the item boundary become that item's
    /// `Failed` outcome and the loop advances.
    pub async fn run(
        &self,
        files: &[PathBuf],
        schedule: Option<&PublishSchedule>,
        progress: &dyn ProgressSink,
    ) -> BatchRun {
        let total = files.len();
        let mut run = BatchRun::default();

        let base = match self.session.current_window().await {
            Ok(handle) => handle,
            Err(e) => {
                // no usable session: still one outcome per file
                for file in files {
                    run.items.push(BatchItem {
                        source: file.clone(),
                        title: fallback_title(file),
                        outcome: Outcome::Failed(format!("browser session unavailable: {}", e)),
                    });
                    progress.item_completed(run.items.len(), total, last(&run));
                }
                progress.batch_completed(&run);
                return run;
            }
        };

        for file in files {
            info!("processing {}", file.display());
            let (title, outcome) = match self.run_item(file, schedule).await {
                Ok((title, PublishOutcome::Published)) => (title, Outcome::Published),
                Ok((title, PublishOutcome::PreparedManual)) => {
                    (title, Outcome::PreparedManualFallback)
                }
                Err(e) => (fallback_title(file), Outcome::Failed(e.to_string())),
            };

            // one write window at a time: drop whatever the item left open
            // and return focus to the base window, success or not
            if let Err(e) = self.session.close_extra_windows(&base).await {
                warn!("window cleanup after item failed: {}", e);
            }

            run.items.push(BatchItem {
                source: file.clone(),
                title,
                outcome,
            });
            progress.item_completed(run.items.len(), total, last(&run));
        }

        progress.batch_completed(&run);
        run
    }

    async fn run_item(
        &self,
        file: &Path,
        schedule: Option<&PublishSchedule>,
    ) -> Result<(String, PublishOutcome)> {
        let article = ArticleFile::load(file)?;

        let mut navigator = EditorNavigator::new(self.session, self.selectors);
        navigator.open_markdown_editor().await?;

        let composer = PostComposer::new(self.session, self.selectors);
        composer.fill_title(&article.title).await?;
        composer.fill_body(&article.body).await?;

        let sequencer = PublishSequencer::new(self.session, self.selectors);
        let outcome = sequencer.confirm_and_publish(schedule).await?;
        Ok((article.title, outcome))
    }
}

fn fallback_title(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

fn last(run: &BatchRun) -> &BatchItem {
    run.items.last().expect("item was just pushed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, outcome: Outcome) -> BatchItem {
        BatchItem {
            source: PathBuf::from(format!("{title}.txt")),
            title: title.into(),
            outcome,
        }
    }

    #[test]
    fn prepared_manual_counts_as_success() {
        assert!(Outcome::Published.is_success());
        assert!(Outcome::PreparedManualFallback.is_success());
        assert!(!Outcome::Failed("write button not found".into()).is_success());
    }

    #[test]
    fn aggregate_counters() {
        let run = BatchRun {
            items: vec![
                item("a", Outcome::Published),
                item("b", Outcome::Failed("write button not found on the current page".into())),
                item("c", Outcome::PreparedManualFallback),
            ],
        };
        assert_eq!(run.total(), 3);
        assert_eq!(run.succeeded(), 2);
        assert_eq!(run.failed(), 1);
    }

    #[test]
    fn empty_run_has_zero_counters() {
        let run = BatchRun::default();
        assert_eq!(run.total(), 0);
        assert_eq!(run.succeeded(), 0);
        assert_eq!(run.failed(), 0);
    }

    #[test]
    fn fallback_title_uses_file_stem() {
        assert_eq!(fallback_title(Path::new("/data/여름_휴가.txt")), "여름_휴가");
    }
}
