//! Write-page automation: navigation, composition, publishing.

mod composer;
mod navigator;
mod publisher;

pub use composer::{EditorSurface, PostComposer};
pub use navigator::{EditorNavigator, NavState};
pub use publisher::{PublishOutcome, PublishSequencer};
