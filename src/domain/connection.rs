use serde::{Deserialize, Serialize};

/// Missing fields fall back to [`ConnectionProfile::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionProfile {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Format: user@host:port/database (never includes the password)
    pub fn display_name(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self::new("localhost", 3306, "", "root", "")
    }
}
