//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = match (std::env::var(var_name), cap.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => return Err(ConfigError::EnvVarNotSet(var_name.to_string())),
            };
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    fn expand_paths(config: &mut Config) {
        config.store.path = Self::expand_pathbuf(&config.store.path);
        if let Some(dir) = &config.logging.dir {
            config.logging.dir = Some(Self::expand_pathbuf(dir));
        }
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/.kbsearch`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbsearch_protocols::SearchMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.search.max_match_count, 50);
        assert_eq!(config.search.default_mode, SearchMode::Hybrid);
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.kbsearch");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [search]
            default_match_count = 8
            max_match_count = 30
            num_candidates = 200
            default_mode = "semantic"

            [embedding]
            provider = "hashing"
            dimension = 64

            [store]
            path = "/tmp/kb.db"

            [logging]
            level = "debug"
            dir = "/tmp/kb-logs"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.search.default_match_count, 8);
        assert_eq!(config.search.max_match_count, 30);
        assert_eq!(config.search.num_candidates, 200);
        assert_eq!(config.search.default_mode, SearchMode::Semantic);
        assert_eq!(config.embedding.provider, "hashing");
        assert_eq!(config.embedding.dimension, 64);
        assert_eq!(config.store.path, PathBuf::from("/tmp/kb.db"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/tmp/kb-logs")));
    }

    #[test]
    fn test_tilde_store_path_expanded() {
        let content = r#"
            [store]
            path = "~/kb/knowledge.db"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(!config.store.path.to_string_lossy().starts_with('~'));
        assert!(config.store.path.ends_with("kb/knowledge.db"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[search]").unwrap();
        writeln!(file, "max_match_count = 12").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.search.max_match_count, 12);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.search.default_match_count, 5);
    }

    #[test]
    fn test_load_invalid_toml() {
        let content = "invalid = [unclosed";
        let result = ConfigLoader::load_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("KBSEARCH_TEST_API_KEY", "sk-test");
        }
        let content = r#"
            [embedding]
            api_key = "${KBSEARCH_TEST_API_KEY}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.embedding.api_key, "sk-test");
        unsafe {
            std::env::remove_var("KBSEARCH_TEST_API_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_KBSEARCH_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_default() {
        let content = r#"
            [embedding]
            api_key = "${NONEXISTENT_KBSEARCH_KEY_67890:-}"
            model = "${NONEXISTENT_KBSEARCH_MODEL_67890:-text-embedding-3-large}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.embedding.api_key, "");
        assert_eq!(config.embedding.model, "text-embedding-3-large");
    }

    #[test]
    fn test_expand_env_vars_set_overrides_default() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("KBSEARCH_TEST_DEFAULTED_KEY", "sk-live");
        }
        let expanded =
            ConfigLoader::expand_env_vars("key = \"${KBSEARCH_TEST_DEFAULTED_KEY:-none}\"").unwrap();
        assert_eq!(expanded, "key = \"sk-live\"");
        unsafe {
            std::env::remove_var("KBSEARCH_TEST_DEFAULTED_KEY");
        }
    }

    #[test]
    fn test_shipped_config_loads_without_api_key() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.embedding.provider, "openai");
        if std::env::var("OPENAI_API_KEY").is_err() {
            let result = crate::ConfigValidator::validate(&config).unwrap();
            assert!(result.is_valid());
            assert!(result.warnings.iter().any(|w| w.path == "embedding.api_key"));
        }
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }
}
