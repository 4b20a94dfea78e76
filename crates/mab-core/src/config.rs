use std::{env, time::Duration};

use crate::{completion::CompletionParams, errors::Error, security::AllowList, Result};

/// Users allowed when `ALLOWED_USERS` is not set.
pub const DEFAULT_ALLOWED_USERS: [i64; 2] = [986853662, 640886937];

pub const DEFAULT_HTTP_PORT: u16 = 10000;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_TIMEOUT: Duration = Duration::from_secs(120);

/// Typed process configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub allowed_users: AllowList,

    // Completion service
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
    pub completion: CompletionParams,

    // Liveness listener
    pub http_port: u16,
}

impl Config {
    /// Load `.env` (if present, without overriding the real environment) and
    /// then read the process environment.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::Config(format!(".env could not be loaded: {e}")));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TELEGRAM_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_TOKEN environment variable is required".to_string())
            })?;

        let openai_api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            Error::Config("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        let allowed_users = match get("ALLOWED_USERS") {
            Some(raw) => AllowList::new(parse_csv_i64(&raw)?),
            None => AllowList::new(DEFAULT_ALLOWED_USERS),
        };

        let http_port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT must be a port number: {raw}: {e}")))?,
            None => DEFAULT_HTTP_PORT,
        };

        let openai_base_url = get("OPENAI_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let openai_timeout = match get("OPENAI_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("OPENAI_TIMEOUT_SECS must be whole seconds: {raw}: {e}"))
            })?),
            None => DEFAULT_OPENAI_TIMEOUT,
        };

        let mut completion = CompletionParams::default();
        if let Some(model) = get("OPENAI_MODEL") {
            completion.model = model.trim().to_string();
        }

        Ok(Self {
            telegram_bot_token,
            allowed_users,
            openai_api_key,
            openai_base_url,
            openai_timeout,
            completion,
            http_port,
        })
    }
}

fn parse_csv_i64(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| Error::Config(format!("ALLOWED_USERS entry {s:?}: {e}")))
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::UserId;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert_eq!(cfg.http_port, 10000);
        assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.openai_timeout, DEFAULT_OPENAI_TIMEOUT);
        assert_eq!(cfg.completion.model, "gpt-4o-mini");
        assert!(cfg.allowed_users.is_authorized(Some(UserId(986853662))));
        assert!(cfg.allowed_users.is_authorized(Some(UserId(640886937))));
        assert_eq!(cfg.allowed_users.len(), 2);
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("TELEGRAM_TOKEN")));
    }

    #[test]
    fn blank_api_key_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("OPENAI_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn legacy_token_name_is_accepted() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "legacy"),
            ("OPENAI_API_KEY", "k"),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "legacy");
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("OPENAI_API_KEY", "k"),
            ("PORT", "8080"),
            ("ALLOWED_USERS", " 1, 2 ,,3"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("OPENAI_TIMEOUT_SECS", "5"),
            ("OPENAI_MODEL", "gpt-4o"),
        ]))
        .unwrap();

        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.allowed_users.len(), 3);
        assert!(cfg.allowed_users.is_authorized(Some(UserId(3))));
        assert!(!cfg.allowed_users.is_authorized(Some(UserId(986853662))));
        assert_eq!(cfg.openai_base_url, "http://localhost:9000/v1");
        assert_eq!(cfg.openai_timeout, Duration::from_secs(5));
        assert_eq!(cfg.completion.model, "gpt-4o");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("OPENAI_API_KEY", "k"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("PORT")));
    }

    #[test]
    fn invalid_allowed_user_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("OPENAI_API_KEY", "k"),
            ("ALLOWED_USERS", "1,abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("abc")));
    }
}
