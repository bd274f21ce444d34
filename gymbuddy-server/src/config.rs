use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
    /// Insert the sample exercise catalog on startup
    pub seed: bool,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub ttl_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Security {
    /// PBKDF2 rounds for newly hashed passwords
    pub password_iterations: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub session: Session,
    pub security: Security,
}

/// Environment variables that override file settings
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATABASE_PATH", "database.path"),
    ("SEED_DATA", "database.seed"),
    ("SESSION_TTL_DAYS", "session.ttl_days"),
    ("PASSWORD_ITERATIONS", "security.password_iterations"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(|name| std::env::var(name).ok())
    }

    /// Build settings from `settings.toml` (if present), defaults and the
    /// given environment lookup
    pub fn load<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        let config_file_name = "settings.toml";
        for path in [
            PathBuf::from(config_file_name),
            PathBuf::from("gymbuddy-server").join(config_file_name),
        ] {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "gymbuddy.db")?
            .set_default("database.seed", false)?
            .set_default("session.ttl_days", crate::session::DEFAULT_SESSION_TTL_DAYS)?
            .set_default(
                "security.password_iterations",
                crate::password::DEFAULT_ITERATIONS,
            )?;

        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::load(|name| vars.get(name).cloned()).expect("settings should load")
    }

    #[test]
    fn test_defaults() {
        let settings = load_with(&[]);
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.session.ttl_days, 30);
        assert!(!settings.database.seed);
        assert_eq!(
            settings.security.password_iterations,
            crate::password::DEFAULT_ITERATIONS
        );
    }

    #[test]
    fn test_env_overrides() {
        let settings = load_with(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_PATH", "/tmp/test.db"),
            ("SEED_DATA", "true"),
            ("SESSION_TTL_DAYS", "7"),
            ("PASSWORD_ITERATIONS", "1000"),
        ]);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.path, "/tmp/test.db");
        assert!(settings.database.seed);
        assert_eq!(settings.session.ttl_days, 7);
        assert_eq!(settings.security.password_iterations, 1000);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let vars: HashMap<&str, &str> = [("PORT", "not-a-port")].into_iter().collect();
        let result = Settings::load(|name| vars.get(name).map(|v| v.to_string()));
        assert!(result.is_err());
    }
}
