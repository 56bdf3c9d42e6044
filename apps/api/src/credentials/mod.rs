//! Credential resolver: finds provider API keys across ordered sources.
//!
//! `CredentialStore` is the process-wide cache in front of the resolver.
//! It is created once at startup, shared through `AppState`, and written only
//! when a key is first resolved or when `invalidate` is called.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, error, info, warn};

use crate::llm_client::Provider;

/// Section of the secrets file checked before the top level.
const DEFAULT_SECTION: &str = "default";

/// A place an API key may come from, consulted in list order.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// The process environment.
    Environment,
    /// A `.env` file loaded into the environment, after which the environment is read again.
    EnvFile(PathBuf),
    /// A TOML secrets file, `[default]` section first, then top-level keys.
    SecretsFile(PathBuf),
}

impl CredentialSource {
    fn lookup(&self, provider: Provider) -> Option<String> {
        match self {
            CredentialSource::Environment => from_environment(provider),
            CredentialSource::EnvFile(path) => {
                load_env_file(path);
                from_environment(provider)
            }
            CredentialSource::SecretsFile(path) => from_secrets_file(path, provider),
        }
    }
}

/// The standard lookup order: environment, `.env`, then the secrets file.
pub fn default_sources(env_file: &Path, secrets_file: &Path) -> Vec<CredentialSource> {
    vec![
        CredentialSource::Environment,
        CredentialSource::EnvFile(env_file.to_path_buf()),
        CredentialSource::SecretsFile(secrets_file.to_path_buf()),
    ]
}

fn resolve_provider(provider: Provider, sources: &[CredentialSource]) -> Option<String> {
    for source in sources {
        if let Some(key) = source.lookup(provider) {
            debug!(%provider, ?source, "API key resolved");
            return Some(key);
        }
    }
    error!("No API key found for provider: {}", provider.name());
    None
}

/// Caching front for the resolver. Misses are not cached, so a key added later is picked up.
pub struct CredentialStore {
    sources: Vec<CredentialSource>,
    cache: RwLock<HashMap<Provider, String>>,
}

impl CredentialStore {
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self {
            sources,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, provider: Provider) -> Option<String> {
        if let Some(key) = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&provider).cloned())
        {
            return Some(key);
        }

        let key = resolve_provider(provider, &self.sources)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(provider, key.clone());
        }
        Some(key)
    }

    /// Looks a key up by provider name, returning an empty string when none is found.
    pub fn resolve(&self, provider_name: &str) -> String {
        let Some(provider) = Provider::from_name(provider_name) else {
            warn!("Unknown provider: {provider_name}");
            return String::new();
        };
        self.get(provider).unwrap_or_default()
    }

    pub fn has(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }

    /// Whether a key for `provider` is already cached. Never consults the sources.
    pub fn is_cached(&self, provider: Provider) -> bool {
        self.cache
            .read()
            .map(|cache| cache.contains_key(&provider))
            .unwrap_or(false)
    }

    /// Drops every cached key; the next `get` re-reads the sources.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
        info!("Credential cache invalidated");
    }

    /// Resolves every provider once and logs availability (never the keys).
    pub fn preload(&self) {
        for provider in Provider::ALL {
            if self.has(provider) {
                info!("{provider} API key available");
            } else {
                warn!(
                    "{provider} API key not found; set {} to enable {provider} models",
                    provider.api_key_env()
                );
            }
        }
    }

    #[cfg(test)]
    pub fn insert(&self, provider: Provider, key: &str) {
        self.cache
            .write()
            .unwrap()
            .insert(provider, key.to_string());
    }
}

/// Strips any wrapping quote characters; an empty result counts as absent.
fn clean_key(raw: &str) -> Option<String> {
    let key = raw.trim().trim_matches(|c: char| c == '"' || c == '\'');
    (!key.is_empty()).then(|| key.to_string())
}

fn from_environment(provider: Provider) -> Option<String> {
    std::env::var(provider.api_key_env())
        .ok()
        .and_then(|v| clean_key(&v))
}

/// Existing variables are never overridden, so repeated loads are harmless.
fn load_env_file(path: &Path) {
    if let Err(e) = dotenvy::from_path(path) {
        debug!("Skipping env file {}: {e}", path.display());
    }
}

fn from_secrets_file(path: &Path, provider: Provider) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("Skipping secrets file {}: {e}", path.display());
            return None;
        }
    };

    let secrets: toml::Table = match contents.parse() {
        Ok(table) => table,
        Err(e) => {
            warn!("Could not parse secrets file {}: {e}", path.display());
            return None;
        }
    };

    let var = provider.api_key_env();
    secrets
        .get(DEFAULT_SECTION)
        .and_then(|section| section.get(var))
        .and_then(toml::Value::as_str)
        .and_then(clean_key)
        .or_else(|| {
            secrets
                .get(var)
                .and_then(toml::Value::as_str)
                .and_then(clean_key)
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    fn clean_env() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("ANTHROPIC_API_KEY");
    }

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn store(sources: Vec<CredentialSource>) -> CredentialStore {
        CredentialStore::new(sources)
    }

    /// Sources pointing at files that do not exist.
    fn empty_sources(dir: &TempDir) -> Vec<CredentialSource> {
        default_sources(&dir.path().join(".env"), &dir.path().join("secrets.toml"))
    }

    #[test]
    fn test_clean_key_strips_quotes() {
        assert_eq!(clean_key("\"sk-abc\"").as_deref(), Some("sk-abc"));
        assert_eq!(clean_key("'sk-abc'").as_deref(), Some("sk-abc"));
        assert_eq!(clean_key("\"'sk-abc'\"").as_deref(), Some("sk-abc"));
        assert_eq!(clean_key("sk-abc").as_deref(), Some("sk-abc"));
        assert_eq!(clean_key("\"\""), None);
        assert_eq!(clean_key(""), None);
    }

    #[test]
    #[serial]
    fn test_unknown_provider_is_empty() {
        clean_env();
        let dir = TempDir::new().unwrap();
        assert_eq!(store(empty_sources(&dir)).resolve("gemini"), "");
    }

    #[test]
    #[serial]
    fn test_nothing_configured_is_empty() {
        clean_env();
        let dir = TempDir::new().unwrap();
        assert_eq!(store(empty_sources(&dir)).resolve("openai"), "");
        assert_eq!(store(empty_sources(&dir)).resolve("anthropic"), "");
    }

    #[test]
    #[serial]
    fn test_environment_wins() {
        clean_env();
        std::env::set_var("OPENAI_API_KEY", "'sk-from-env'");
        let secrets = write_file("[default]\nOPENAI_API_KEY = \"sk-from-secrets\"\n");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(&dir.path().join(".env"), secrets.path());

        assert_eq!(store(sources.clone()).resolve("openai"), "sk-from-env");
        clean_env();
    }

    #[test]
    #[serial]
    fn test_env_file_is_loaded_when_environment_is_empty() {
        clean_env();
        let env_file = write_file("ANTHROPIC_API_KEY=\"sk-ant-from-dotenv\"\n");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(env_file.path(), &dir.path().join("secrets.toml"));

        assert_eq!(store(sources.clone()).resolve("anthropic"), "sk-ant-from-dotenv");
        // The file was loaded into the process environment.
        assert!(std::env::var("ANTHROPIC_API_KEY").is_ok());
        clean_env();
    }

    #[test]
    #[serial]
    fn test_secrets_default_section_with_quotes() {
        clean_env();
        let secrets = write_file("[default]\nOPENAI_API_KEY = \"'sk-quoted'\"\n");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(&dir.path().join(".env"), secrets.path());

        assert_eq!(store(sources.clone()).resolve("openai"), "sk-quoted");
    }

    #[test]
    #[serial]
    fn test_secrets_top_level_fallback() {
        clean_env();
        let secrets = write_file("ANTHROPIC_API_KEY = \"sk-ant-top\"\n\n[default]\nOTHER = \"x\"\n");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(&dir.path().join(".env"), secrets.path());

        assert_eq!(store(sources.clone()).resolve("anthropic"), "sk-ant-top");
    }

    #[test]
    #[serial]
    fn test_unparseable_secrets_file_is_empty() {
        clean_env();
        let secrets = write_file("this is = = not toml [");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(&dir.path().join(".env"), secrets.path());

        assert_eq!(store(sources.clone()).resolve("openai"), "");
    }

    #[test]
    #[serial]
    fn test_repeated_resolution_is_stable() {
        clean_env();
        std::env::set_var("OPENAI_API_KEY", "sk-stable");
        let env_file = write_file("OPENAI_API_KEY=sk-other\n");
        let dir = TempDir::new().unwrap();
        let sources = default_sources(env_file.path(), &dir.path().join("secrets.toml"));

        let first = store(sources.clone()).resolve("openai");
        let second = store(sources.clone()).resolve("openai");
        assert_eq!(first, "sk-stable");
        assert_eq!(first, second);
        clean_env();
    }

    #[test]
    #[serial]
    fn test_store_caches_until_invalidated() {
        clean_env();
        std::env::set_var("OPENAI_API_KEY", "sk-first");
        let store = CredentialStore::new(vec![CredentialSource::Environment]);

        assert_eq!(store.get(Provider::OpenAi).as_deref(), Some("sk-first"));

        std::env::set_var("OPENAI_API_KEY", "sk-second");
        assert_eq!(store.get(Provider::OpenAi).as_deref(), Some("sk-first"));

        store.invalidate();
        assert_eq!(store.get(Provider::OpenAi).as_deref(), Some("sk-second"));
        clean_env();
    }

    #[test]
    #[serial]
    fn test_is_cached_does_not_resolve() {
        clean_env();
        std::env::set_var("OPENAI_API_KEY", "sk-lazy");
        let store = CredentialStore::new(vec![CredentialSource::Environment]);

        assert!(!store.is_cached(Provider::OpenAi));
        assert!(store.has(Provider::OpenAi));
        assert!(store.is_cached(Provider::OpenAi));

        store.invalidate();
        assert!(!store.is_cached(Provider::OpenAi));
        clean_env();
    }

    #[test]
    #[serial]
    fn test_store_does_not_cache_misses() {
        clean_env();
        let store = CredentialStore::new(vec![CredentialSource::Environment]);
        assert!(!store.has(Provider::Anthropic));

        std::env::set_var("ANTHROPIC_API_KEY", "sk-late");
        assert_eq!(store.get(Provider::Anthropic).as_deref(), Some("sk-late"));
        clean_env();
    }
}
