use anyhow::Context as _;
use serde::Deserialize;
use std::path::Path;

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> usize {
    16
}

const DEFAULT_LOG_LEVEL: &str = "warn";

impl ConfigFile {
    /// Read `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e:#}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url)?;
        }
        Ok(())
    }

    /// Combine the file with a CLI override and `DATABASE_URL`.
    ///
    /// Precedence for the URL: `database_override`, then `database.url`, then
    /// the `DATABASE_URL` environment variable.
    pub fn resolve(
        self,
        database_override: Option<&str>,
        env_url: Option<String>,
    ) -> anyhow::Result<Settings> {
        let database_url = database_override
            .map(str::to_string)
            .or(self.database.url)
            .or(env_url)
            .ok_or_else(|| {
                anyhow::anyhow!("no database configured: set database.url, --database or DATABASE_URL")
            })?;

        if database_url.trim().is_empty() {
            anyhow::bail!("database url must not be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }

        Ok(Settings {
            database_url,
            max_connections: self.database.max_connections,
            log_level: self
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Replace every `${NAME}` in `input` with the value of the environment variable.
fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let (name, tail) = rest[open + 2..]
            .split_once('}')
            .with_context(|| format!("`${{` is never closed in {input:?}"))?;
        if name.is_empty() {
            anyhow::bail!("empty variable name in {input:?}");
        }
        let value = std::env::var(name)
            .with_context(|| format!("{name} is referenced by the config but not set"))?;
        out.push_str(&value);
        rest = tail;
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let file = ConfigFile::parse(
            r#"
log_level = "debug"

[database]
url = "postgres://localhost/jobly"
max_connections = 4
"#,
        )
        .unwrap();
        let settings = file.resolve(None, None).unwrap();
        assert_eq!(
            settings,
            Settings {
                database_url: "postgres://localhost/jobly".into(),
                max_connections: 4,
                log_level: "debug".into(),
            }
        );
    }

    #[test]
    fn override_beats_file_and_env() {
        let file = ConfigFile::parse("[database]\nurl = \"postgres://file/db\"\n").unwrap();
        let settings = file
            .resolve(Some("postgres://cli/db"), Some("postgres://env/db".into()))
            .unwrap();
        assert_eq!(settings.database_url, "postgres://cli/db");
        assert_eq!(settings.max_connections, 16);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn falls_back_to_env_url() {
        let settings = ConfigFile::default()
            .resolve(None, Some("postgres://env/db".into()))
            .unwrap();
        assert_eq!(settings.database_url, "postgres://env/db");
    }

    #[test]
    fn missing_url_is_error() {
        assert!(ConfigFile::default().resolve(None, None).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::parse("colour = \"blue\"").is_err());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let file = ConfigFile::parse("[database]\nmax_connections = 0\n").unwrap();
        assert!(file.resolve(Some("postgres://x/db"), None).is_err());
    }

    #[test]
    fn expands_env_references() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(expand_env_vars("a-${PATH}-b").unwrap(), format!("a-{path}-b"));
        assert!(expand_env_vars("${UNTERMINATED").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert_eq!(expand_env_vars("no refs, $5 stays").unwrap(), "no refs, $5 stays");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let file = ConfigFile::load(Path::new("definitely/not/here/jobly.toml")).unwrap();
        assert!(file.database.url.is_none());
    }
}
