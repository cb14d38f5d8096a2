use std::path::{Path, PathBuf};

use crate::error::Error;

/// Project configuration loaded from `.jot.toml`: the evaluator command and
/// where rendered pages go.
pub struct Config {
    /// Evaluator command: program followed by its arguments.
    pub backend_command: Vec<String>,
    /// Directory rendered pages are written to; next to the source file
    /// when unset.
    pub out_dir: Option<PathBuf>,
}

/// Raw TOML structure for `.jot.toml`.
#[derive(serde::Deserialize)]
struct JotTomlConfig {
    #[serde(default)]
    backend: Option<BackendToml>,
    #[serde(default)]
    render: Option<RenderToml>,
}

#[derive(serde::Deserialize)]
struct BackendToml {
    #[serde(default)]
    command: Vec<String>,
}

#[derive(serde::Deserialize)]
struct RenderToml {
    #[serde(default)]
    out_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from `.jot.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed — never silently falls back to defaults
    /// when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".jot.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: JotTomlConfig = toml::from_str(&content)?;
        let mut config = Self::defaults();
        if let Some(backend) = raw.backend
            && !backend.command.is_empty()
        {
            config.backend_command = backend.command;
        }
        if let Some(render) = raw.render {
            config.out_dir = render.out_dir;
        }
        return Ok(config);
    }

    /// The stock configuration: a `jot-backend` evaluator on the PATH,
    /// pages written next to their source file.
    fn defaults() -> Self {
        return Self {
            backend_command: vec!["jot-backend".to_string()],
            out_dir: None,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Config;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.backend_command, vec!["jot-backend".to_string()]);
        assert!(config.out_dir.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".jot.toml"),
            "[backend]\ncommand = [\"java-eval\", \"--local\"]\n\n[render]\nout_dir = \"pages\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(
            config.backend_command,
            vec!["java-eval".to_string(), "--local".to_string()]
        );
        assert_eq!(config.out_dir.as_deref(), Some(std::path::Path::new("pages")));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".jot.toml"), "backend = nonsense\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
