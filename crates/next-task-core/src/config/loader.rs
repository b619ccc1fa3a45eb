//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::{config_file_names, Paths};
use super::types::{Config, GoogleConfig, JiraConfig};
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        "YAML"
    } else {
        "TOML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    debug!(path = %path.display(), "config parsed");
    Ok(config)
}

/// Find the first known configuration file in `config_dir`
pub fn find_config(config_dir: &Path) -> Option<PathBuf> {
    debug!(dir = %config_dir.display(), "searching for config file");
    let found = config_file_names()
        .into_iter()
        .map(|name| config_dir.join(name))
        .find(|path| path.is_file());

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!("no config file found"),
    }
    found
}

/// Apply `NEXT_TASK_*` overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(url) = lookup("NEXT_TASK_JIRA_INSTANCE_URL") {
        debug!("jira enabled from environment");
        config
            .sources
            .jira
            .get_or_insert_with(JiraConfig::default)
            .instance_url = url;
    }

    if let Some(jira) = config.sources.jira.as_mut() {
        if let Some(token) = lookup("NEXT_TASK_JIRA_ACCESS_TOKEN") {
            jira.access_token = token;
        }
        if let Some(jql) = lookup("NEXT_TASK_JIRA_TASK_JQL") {
            jira.jql = jql;
        }
    }

    if let Some(capacity) = lookup("NEXT_TASK_CAPACITY") {
        config.cache.capacity = capacity.parse().map_err(|_| ConfigError::InvalidValue {
            field: "NEXT_TASK_CAPACITY".to_string(),
            message: format!("'{capacity}' is not a positive integer"),
        })?;
    }

    if let Some(dir) = lookup("NEXT_TASK_CACHE_DIR") {
        config.cache.dir = PathBuf::from(dir);
    }

    Ok(())
}

/// Fill unset paths from the well-known layout and auto-enable Google
///
/// Google is enabled without explicit configuration when the default
/// credentials file exists.
pub fn resolve_defaults(config: &mut Config, paths: &Paths) {
    if config.cache.dir.as_os_str().is_empty() {
        config.cache.dir = paths.cache_dir();
    }

    if config.sources.google.is_none() && paths.google_credentials().is_file() {
        debug!("google credentials found, enabling google sources");
        config.sources.google = Some(GoogleConfig::default());
    }

    if let Some(google) = config.sources.google.as_mut() {
        if google.credentials_path.as_os_str().is_empty() {
            google.credentials_path = paths.google_credentials();
        }
        if google.token_path.as_os_str().is_empty() {
            google.token_path = paths.google_token();
        }
    }
}

/// Load, override, resolve and validate the configuration for `paths`
///
/// Returns the config and the file it came from, if any.
pub fn load_settings(paths: &Paths) -> Result<(Config, Option<PathBuf>)> {
    load_settings_with(paths, |name| std::env::var(name).ok())
}

/// [`load_settings`] with an explicit environment lookup
pub fn load_settings_with<F>(paths: &Paths, lookup: F) -> Result<(Config, Option<PathBuf>)>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = find_config(&paths.config_dir());
    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => {
            warn!(dir = %paths.config_dir().display(), "no config found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, lookup)?;
    resolve_defaults(&mut config, paths);
    validate_config(&config)?;

    Ok((config, config_path))
}

/// Resolve only the cache directory, tolerating a broken config
///
/// `NEXT_TASK_CACHE_DIR` wins, then `cache.dir` from a config file that
/// parses, then the default location. Nothing is validated.
pub fn resolve_cache_dir(paths: &Paths) -> PathBuf {
    resolve_cache_dir_with(paths, |name| std::env::var(name).ok())
}

/// [`resolve_cache_dir`] with an explicit environment lookup
pub fn resolve_cache_dir_with<F>(paths: &Paths, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("NEXT_TASK_CACHE_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    let from_file = find_config(&paths.config_dir()).and_then(|path| match load_config(&path) {
        Ok(config) => Some(config.cache.dir),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    });

    from_file
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| paths.cache_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NextTaskError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_config(paths: &Paths, name: &str, content: &str) -> PathBuf {
        let dir = paths.config_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_config_file() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());

        let (config, path) = load_settings_with(&paths, no_env).unwrap();

        assert!(path.is_none());
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.cache.dir, paths.cache_dir());
        assert_eq!(config.http.timeout_secs, 60);
        assert!(config.sources.google.is_none());
        assert!(config.sources.jira.is_none());
    }

    #[test]
    fn test_find_config_prefers_toml() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        let toml_path = write_config(&paths, "next-task.toml", "[cache]\ncapacity = 3\n");
        write_config(&paths, "next-task.yaml", "cache:\n  capacity: 4\n");

        assert_eq!(find_config(&paths.config_dir()), Some(toml_path));
    }

    #[test]
    fn test_load_toml() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        write_config(
            &paths,
            "next-task.toml",
            r#"
[cache]
capacity = 5
dir = "/var/tmp/next-task"

[http]
timeout_secs = 15

[sources.jira]
instance_url = "https://jira.example.com"
access_token = "secret"
jql = "assignee = currentUser()"
"#,
        );

        let (config, path) = load_settings_with(&paths, no_env).unwrap();

        assert!(path.is_some());
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.cache.dir, PathBuf::from("/var/tmp/next-task"));
        assert_eq!(config.http.timeout_secs, 15);
        let jira = config.sources.jira.unwrap();
        assert_eq!(jira.instance_url, "https://jira.example.com");
        assert_eq!(jira.jql, "assignee = currentUser()");
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        write_config(
            &paths,
            "next-task.yaml",
            "cache:\n  capacity: 7\nsources:\n  google:\n    mail: false\n",
        );

        let (config, _) = load_settings_with(&paths, no_env).unwrap();

        assert_eq!(config.cache.capacity, 7);
        let google = config.sources.google.unwrap();
        assert!(!google.mail);
        assert!(google.tasks);
        assert_eq!(google.credentials_path, paths.google_credentials());
        assert_eq!(google.token_path, paths.google_token());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        write_config(&paths, "next-task.toml", "[cache\ncapacity = ");

        let err = load_settings_with(&paths, no_env).unwrap_err();
        assert!(matches!(err, NextTaskError::Config(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_google_enabled_when_credentials_exist() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        let creds = paths.google_credentials();
        std::fs::create_dir_all(creds.parent().unwrap()).unwrap();
        std::fs::write(&creds, "{}").unwrap();

        let (config, _) = load_settings_with(&paths, no_env).unwrap();

        let google = config.sources.google.unwrap();
        assert!(google.mail && google.tasks);
        assert_eq!(google.credentials_path, creds);
    }

    #[test]
    fn test_jira_from_environment() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        let lookup = env(&[
            ("NEXT_TASK_JIRA_INSTANCE_URL", "https://issues.example.org"),
            ("NEXT_TASK_JIRA_ACCESS_TOKEN", "tok"),
            ("NEXT_TASK_JIRA_TASK_JQL", "project = OPS"),
        ]);

        let (config, _) = load_settings_with(&paths, lookup).unwrap();

        let jira = config.sources.jira.unwrap();
        assert_eq!(jira.instance_url, "https://issues.example.org");
        assert_eq!(jira.access_token, "tok");
        assert_eq!(jira.jql, "project = OPS");
    }

    #[test]
    fn test_empty_instance_url_does_not_enable_jira() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("NEXT_TASK_JIRA_INSTANCE_URL", ""),
                ("NEXT_TASK_JIRA_ACCESS_TOKEN", "tok"),
            ]),
        )
        .unwrap();
        assert!(config.sources.jira.is_none());
    }

    #[test]
    fn test_capacity_and_cache_dir_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("NEXT_TASK_CAPACITY", "25"),
                ("NEXT_TASK_CACHE_DIR", "/tmp/elsewhere"),
            ]),
        )
        .unwrap();
        assert_eq!(config.cache.capacity, 25);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/elsewhere"));
    }

    #[test]
    fn test_bad_capacity_override() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, env(&[("NEXT_TASK_CAPACITY", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            NextTaskError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_cache_dir_survives_broken_config() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        write_config(&paths, "next-task.toml", "[cache\ncapacity = ");

        assert_eq!(resolve_cache_dir_with(&paths, no_env), paths.cache_dir());
    }

    #[test]
    fn test_cache_dir_from_file_and_environment() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        write_config(
            &paths,
            "next-task.toml",
            "[cache]\ndir = \"/srv/tasks\"\ncapacity = 0\n",
        );

        assert_eq!(
            resolve_cache_dir_with(&paths, no_env),
            PathBuf::from("/srv/tasks")
        );
        assert_eq!(
            resolve_cache_dir_with(&paths, env(&[("NEXT_TASK_CACHE_DIR", "/tmp/override")])),
            PathBuf::from("/tmp/override")
        );
    }

    #[test]
    fn test_jira_url_without_token_loads() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_base(temp.path());
        let lookup = env(&[("NEXT_TASK_JIRA_INSTANCE_URL", "https://issues.example.org")]);

        let (config, _) = load_settings_with(&paths, lookup).unwrap();

        let jira = config.sources.jira.unwrap();
        assert_eq!(jira.instance_url, "https://issues.example.org");
        assert!(jira.access_token.is_empty());
    }
}
