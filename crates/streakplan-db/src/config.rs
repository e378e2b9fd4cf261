use std::env;

/// Environment variable holding the Postgres connection URL.
pub const DATABASE_URL_ENV: &str = "STREAKPLAN_DATABASE_URL";

/// Database configuration for the schedule store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// Connection URL used when nothing else is configured.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/streakplan";

    /// `STREAKPLAN_DATABASE_URL` if set, otherwise [`Self::DEFAULT_URL`].
    pub fn from_env() -> Self {
        let database_url =
            env::var(DATABASE_URL_ENV).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self { database_url }
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Database name from the URL path, ignoring any `?query` suffix.
    pub fn database_name(&self) -> Option<&str> {
        let without_query = self
            .database_url
            .split('?')
            .next()
            .unwrap_or(&self.database_url);
        let (_, name) = without_query.rsplit_once('/')?;
        if name.is_empty() || name.contains(':') || name.contains('@') {
            None
        } else {
            Some(name)
        }
    }

    /// URL of the `postgres` maintenance database on the same server, used to
    /// issue `CREATE DATABASE`.
    pub fn maintenance_url(&self) -> String {
        match self.database_name() {
            Some(name) => {
                let without_query = self
                    .database_url
                    .split('?')
                    .next()
                    .unwrap_or(&self.database_url);
                let base = &without_query[..without_query.len() - name.len()];
                format!("{base}postgres")
            }
            None => self.database_url.clone(),
        }
    }

    /// The URL with any password replaced by `***`, safe for logs and errors.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return self.database_url.clone();
        };
        let Some((userinfo, host)) = rest.split_once('@') else {
            return self.database_url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
