use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Credentials and paths consumed from the process environment, optionally
/// overlaid from a local `.env`-style file. The automation core itself needs
/// none of these — login is performed by the human — they feed the upstream
/// search and generation clients and the article save path.
///
/// A value in the file overrides the process environment, matching the
/// original tool's behavior of loading `.env` over its surroundings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub gemini_api_key: Option<String>,
    pub save_path: Option<PathBuf>,
}

impl Settings {
    /// Load from the process environment plus `.env` in the working
    /// directory, if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(".env"))
    }

    /// Load from the process environment plus the given file, if present.
    pub fn load_from(env_file: &Path) -> Self {
        let file_vars = match std::fs::read_to_string(env_file) {
            Ok(content) => parse_env_file(&content),
            Err(_) => HashMap::new(),
        };
        if !file_vars.is_empty() {
            debug!("loaded {} entries from {}", file_vars.len(), env_file.display());
        }

        let get = |key: &str| {
            file_vars
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .filter(|v| !v.is_empty())
        };

        Self {
            naver_client_id: get("NAVER_CLIENT_ID"),
            naver_client_secret: get("NAVER_CLIENT_SECRET"),
            gemini_api_key: get("GEMINI_API_KEY"),
            save_path: get("DEFAULT_SAVE_PATH").map(PathBuf::from),
        }
    }
}

/// Parse `key=value` lines. Blank lines and `#` comments are skipped,
/// values may be wrapped in single or double quotes.
fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        if !key.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_key_value_lines() {
        let vars = parse_env_file(
            "# comment\nNAVER_CLIENT_ID=abc\n\nGEMINI_API_KEY=\"quoted key\"\nBROKEN LINE\nEMPTY=\n",
        );
        assert_eq!(vars.get("NAVER_CLIENT_ID").unwrap(), "abc");
        assert_eq!(vars.get("GEMINI_API_KEY").unwrap(), "quoted key");
        assert_eq!(vars.get("EMPTY").unwrap(), "");
        assert!(!vars.contains_key("BROKEN LINE"));
    }

    #[test]
    fn file_values_take_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NAVER_CLIENT_ID=from-file").unwrap();
        let settings = Settings::load_from(file.path());
        assert_eq!(settings.naver_client_id.as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let settings = Settings::load_from(Path::new("/nonexistent/.env"));
        // values may still come from the process environment; the load
        // itself must not fail
        let _ = settings;
    }

    #[test]
    fn empty_values_are_treated_as_unset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GEMINI_API_KEY=").unwrap();
        let settings = Settings::load_from(file.path());
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(settings.gemini_api_key.is_none());
        }
    }
}
