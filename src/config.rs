use crate::adapters::outbound::ProviderSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub listen_addr: String,
    pub db_path: String,
    pub debug: bool,
    pub drain_timeout_secs: u64,

    // Provider call settings
    pub request_timeout_secs: u64,
    pub secret_prefix: String,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub gemini_base_url: String,
    pub mistral_base_url: String,
    pub ollama_base_url: String,
    pub anthropic_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        let providers = ProviderSettings::default();
        Self {
            listen_addr: "0.0.0.0:8090".to_string(),
            db_path: "ai_configs.db".to_string(),
            debug: false,
            drain_timeout_secs: 30,
            request_timeout_secs: 60,
            secret_prefix: String::new(),
            openai_base_url: providers.openai_base_url,
            anthropic_base_url: providers.anthropic_base_url,
            gemini_base_url: providers.gemini_base_url,
            mistral_base_url: providers.mistral_base_url,
            ollama_base_url: providers.ollama_base_url,
            anthropic_max_tokens: providers.anthropic_max_tokens,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            openai_base_url: self.openai_base_url.clone(),
            anthropic_base_url: self.anthropic_base_url.clone(),
            gemini_base_url: self.gemini_base_url.clone(),
            mistral_base_url: self.mistral_base_url.clone(),
            ollama_base_url: self.ollama_base_url.clone(),
            anthropic_max_tokens: self.anthropic_max_tokens,
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let listen_addr = env_or("MODEL_ROUTER_LISTEN_ADDR", defaults.listen_addr);
    let db_path = env_or("MODEL_ROUTER_DB_PATH", defaults.db_path);
    let debug = std::env::var("DEBUG").is_ok();
    let drain_timeout_secs =
        env_parse("MODEL_ROUTER_DRAIN_TIMEOUT_SECS", defaults.drain_timeout_secs);

    let request_timeout_secs =
        env_parse("MODEL_ROUTER_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs);
    if request_timeout_secs == 0 {
        anyhow::bail!("MODEL_ROUTER_REQUEST_TIMEOUT_SECS must be greater than zero");
    }

    let secret_prefix = env_or("MODEL_ROUTER_SECRET_PREFIX", defaults.secret_prefix);

    // Provider endpoints
    let openai_base_url = env_or("MODEL_ROUTER_OPENAI_BASE_URL", defaults.openai_base_url);
    let anthropic_base_url =
        env_or("MODEL_ROUTER_ANTHROPIC_BASE_URL", defaults.anthropic_base_url);
    let gemini_base_url = env_or("MODEL_ROUTER_GEMINI_BASE_URL", defaults.gemini_base_url);
    let mistral_base_url = env_or("MODEL_ROUTER_MISTRAL_BASE_URL", defaults.mistral_base_url);
    let ollama_base_url = env_or("MODEL_ROUTER_OLLAMA_BASE_URL", defaults.ollama_base_url);

    let anthropic_max_tokens =
        env_parse("MODEL_ROUTER_ANTHROPIC_MAX_TOKENS", defaults.anthropic_max_tokens);

    Ok(Config {
        listen_addr,
        db_path,
        debug,
        drain_timeout_secs,
        request_timeout_secs,
        secret_prefix,
        openai_base_url,
        anthropic_base_url,
        gemini_base_url,
        mistral_base_url,
        ollama_base_url,
        anthropic_max_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches distinct variables; the process environment is shared
    // across test threads.

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8090");
        assert_eq!(cfg.db_path, "ai_configs.db");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.anthropic_max_tokens, 4096);
        assert!(cfg.secret_prefix.is_empty());
        assert!(!cfg.debug);
    }

    #[test]
    fn test_default_provider_settings() {
        let settings = Config::default().provider_settings();
        assert_eq!(settings, ProviderSettings::default());
    }

    #[test]
    fn test_load_config_with_custom_listen_addr() {
        std::env::set_var("MODEL_ROUTER_LISTEN_ADDR", "127.0.0.1:9000");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        std::env::remove_var("MODEL_ROUTER_LISTEN_ADDR");
    }

    #[test]
    fn test_load_config_with_custom_db_path() {
        std::env::set_var("MODEL_ROUTER_DB_PATH", "/tmp/test.db");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.db_path, "/tmp/test.db");
        std::env::remove_var("MODEL_ROUTER_DB_PATH");
    }

    #[test]
    fn test_load_config_with_base_urls() {
        std::env::set_var("MODEL_ROUTER_OLLAMA_BASE_URL", "http://gpu-box:11434");
        std::env::set_var("MODEL_ROUTER_GEMINI_BASE_URL", "http://proxy.internal/gemini");
        let cfg = load_config().unwrap();
        let settings = cfg.provider_settings();
        assert_eq!(settings.ollama_base_url, "http://gpu-box:11434");
        assert_eq!(settings.gemini_base_url, "http://proxy.internal/gemini");
        assert_eq!(settings.openai_base_url, "https://api.openai.com");
        std::env::remove_var("MODEL_ROUTER_OLLAMA_BASE_URL");
        std::env::remove_var("MODEL_ROUTER_GEMINI_BASE_URL");
    }

    #[test]
    fn test_load_config_with_secret_prefix_and_tokens() {
        std::env::set_var("MODEL_ROUTER_SECRET_PREFIX", "AI_KEY_");
        std::env::set_var("MODEL_ROUTER_ANTHROPIC_MAX_TOKENS", "8192");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.secret_prefix, "AI_KEY_");
        assert_eq!(cfg.anthropic_max_tokens, 8192);
        std::env::remove_var("MODEL_ROUTER_SECRET_PREFIX");
        std::env::remove_var("MODEL_ROUTER_ANTHROPIC_MAX_TOKENS");
    }

    #[test]
    fn test_load_config_with_debug() {
        std::env::set_var("DEBUG", "1");
        let cfg = load_config().unwrap();
        assert!(cfg.debug);
        std::env::remove_var("DEBUG");
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        std::env::set_var("MODEL_ROUTER_DRAIN_TIMEOUT_SECS", "not_a_number");
        let cfg = load_config().unwrap();
        assert_eq!(cfg.drain_timeout_secs, 30);
        std::env::remove_var("MODEL_ROUTER_DRAIN_TIMEOUT_SECS");
    }

    #[test]
    fn test_env_parse_helper() {
        std::env::set_var("MODEL_ROUTER_TEST_PARSE_U32", " 17 ");
        assert_eq!(env_parse("MODEL_ROUTER_TEST_PARSE_U32", 0u32), 17);
        assert_eq!(env_parse("MODEL_ROUTER_TEST_PARSE_MISSING", 5u64), 5);
        std::env::remove_var("MODEL_ROUTER_TEST_PARSE_U32");
    }
}
