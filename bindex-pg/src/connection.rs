//! Connection settings for the PostgreSQL source.

use bindex_core::{ConfigError, ExportError, ExportResult, SourceConfig};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio_postgres::config::Host;

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
}

impl Driver {
    /// Resolve a configured driver identifier.
    ///
    /// Accepts `postgres`, `postgresql` and `pg` in any case, plus the JDBC
    /// class name `org.postgresql.Driver` so existing job configurations
    /// carry over unchanged.
    pub fn resolve(id: &str) -> ExportResult<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" | "org.postgresql.driver" => Ok(Driver::Postgres),
            _ => Err(ExportError::DriverLoad {
                driver: id.to_string(),
            }),
        }
    }
}

/// Where and how to connect. The password never appears in `Debug` output.
#[derive(Clone)]
pub struct ConnectionSpec {
    url: String,
    user: Option<String>,
    password: Option<SecretString>,
    statement_timeout: Duration,
}

impl std::fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("statement_timeout", &self.statement_timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionSpec {
    pub fn new(url: impl Into<String>, statement_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            statement_timeout,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into().into()));
        self
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        let mut spec = Self::new(source.url.clone(), source.statement_timeout());
        if let Some(user) = &source.user {
            spec = spec.with_user(user.clone());
        }
        if let Some(password) = &source.password {
            spec = spec.with_password(password.clone());
        }
        spec
    }

    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout
    }

    /// Build the driver configuration. Explicit user and password override
    /// any embedded in the URL.
    pub fn pg_config(&self) -> ExportResult<tokio_postgres::Config> {
        let mut config: tokio_postgres::Config =
            self.url.parse().map_err(|e: tokio_postgres::Error| {
                ExportError::Config(ConfigError::InvalidValue {
                    field: "source.url",
                    reason: e.to_string(),
                })
            })?;

        if let Some(user) = &self.user {
            config.user(user);
        }
        if let Some(password) = &self.password {
            config.password(password.expose_secret());
        }
        if !self.statement_timeout.is_zero() {
            config.connect_timeout(self.statement_timeout);
        }
        Ok(config)
    }
}

/// `user@host:port/dbname` for logs; never includes the password.
pub fn describe_target(config: &tokio_postgres::Config) -> String {
    let hosts: Vec<String> = config
        .get_hosts()
        .iter()
        .zip(config.get_ports().iter().chain(std::iter::repeat(&5432)))
        .map(|(host, port)| match host {
            Host::Tcp(name) => format!("{}:{}", name, port),
            #[cfg(unix)]
            Host::Unix(path) => format!("{}:{}", path.display(), port),
        })
        .collect();

    format!(
        "{}@{}/{}",
        config.get_user().unwrap_or("-"),
        hosts.join(","),
        config.get_dbname().unwrap_or("-")
    )
}
