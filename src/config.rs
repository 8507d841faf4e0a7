use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub jobs_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_vars(
            env::var("HOST").ok(),
            env::var("PORT").ok(),
            env::var("JOBS_DIR").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>, jobs_dir: Option<String>) -> Result<Self> {
        let host = host.unwrap_or_else(|| "127.0.0.1".to_string());
        let port = port.unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let jobs_dir = PathBuf::from(jobs_dir.unwrap_or_else(|| "jobs".to_string()));

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            jobs_dir,
        })
    }
}
