mod env;
mod schema;

pub use env::Settings;
pub use schema::{BrowserConfig, RunnerConfig, Selectors, WaitConfig};
