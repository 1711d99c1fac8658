use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::DEFAULT_TOKEN_TTL_HOURS;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Lifetime of issued login tokens, in hours.
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("keyrack.db")
    }

    /// File holding the token-signing secret. Created by `admin init`.
    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(".token_secret")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}
