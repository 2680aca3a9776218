use serde_derive::Deserialize;
use std::io::{ErrorKind, Read};
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::*;

pub const DEFAULT_CONFIG_PATH: &str = "taskboard.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error {0} when reading config")]
    IoError(#[from] std::io::Error),
    #[error("cannot open config file '{0}' : {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("UTF8 format error when reading config")]
    Utf8Error,
    #[error("format error {0} when reading config")]
    FormatError(#[from] serde_yaml::Error),
    #[error("invalid listen host '{0}'")]
    InvalidHost(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Listen {
    pub ipv6: Option<bool>,
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub timeout: Option<u64>,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            ipv6: None,
            host: None,
            port: default_port(),
            timeout: None,
        }
    }
}

impl Listen {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = match &self.host {
            Some(host) => host
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(host.clone()))?,
            None if self.ipv6.unwrap_or(false) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            None => IpAddr::from([127, 0, 0, 1]),
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn default_port() -> u16 {
    3001
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/tasks.json")
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listen: Listen,
    #[serde(default)]
    pub storage: StorageConfig,
    pub log: Option<crate::log::Log>,
}

impl Config {
    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(&s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let p = path.as_ref();
        let mut file = File::open(p).map_err(|e| ConfigError::OpeningError(p.to_owned(), e))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        let contents = String::from_utf8(contents).map_err(|_| ConfigError::Utf8Error)?;
        let config = Config::from_str(&contents)?;
        Ok(config)
    }

    /// Like `from_file`, but a missing file means all defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Config::from_file(path) {
            Err(ConfigError::OpeningError(_, err)) if err.kind() == ErrorKind::NotFound => {
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// `PORT` from the environment wins over the configured port.
    pub fn with_port_override(mut self, port: Option<String>) -> Result<Self, ConfigError> {
        if let Some(port) = port {
            self.listen.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        Ok(self)
    }
}
