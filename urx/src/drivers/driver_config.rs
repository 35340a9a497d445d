use serde::{Deserialize, Serialize};

use crate::LinkError;

/// Port of the controller's command interface.
pub const DEFAULT_PORT: u16 = 30002;

/// ```rust,ignore
/// let config = UrxDriverConfig::new("192.168.0.10".to_string(), 30002);
/// config.validate()?;
/// let driver = UrxDriver::connect(config).await?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UrxDriverConfig {
    pub addr: String,
    pub port: u16,
    /// How long a request waits for its response.
    pub request_timeout_ms: u64,
    pub connect_retries: u32,
}

impl UrxDriverConfig {
    pub fn new(addr: String, port: u16) -> Self {
        Self {
            addr,
            port,
            ..Default::default()
        }
    }

    /// Builds a config from an operator supplied endpoint, `host`, `host:port`
    /// or `[v6addr]:port`. `default_port` is used when the endpoint has no port.
    pub fn from_endpoint(endpoint: &str, default_port: u16) -> Result<Self, LinkError> {
        let endpoint = endpoint.trim();
        let invalid_port = || LinkError::InvalidConfig(format!("invalid port in '{}'", endpoint));

        let (addr, port) = if let Some(rest) = endpoint.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| LinkError::InvalidConfig(format!("unclosed '[' in '{}'", endpoint)))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => port.parse::<u16>().map_err(|_| invalid_port())?,
                None if tail.is_empty() => default_port,
                None => return Err(invalid_port()),
            };
            (host.to_string(), port)
        } else {
            match endpoint.rsplit_once(':') {
                // a bare IPv6 address has more than one colon and no port
                Some((host, port)) if !host.contains(':') => {
                    (host.to_string(), port.parse::<u16>().map_err(|_| invalid_port())?)
                }
                _ => (endpoint.to_string(), default_port),
            }
        };
        let config = Self::new(addr, port);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.addr.is_empty() {
            return Err(LinkError::InvalidConfig("Address cannot be empty.".to_string()));
        }
        if self.port == 0 {
            return Err(LinkError::InvalidConfig("Port number must be greater than 0.".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(LinkError::InvalidConfig("Request timeout must be greater than 0.".to_string()));
        }
        if self.connect_retries == 0 {
            return Err(LinkError::InvalidConfig("At least one connection attempt is required.".to_string()));
        }
        Ok(())
    }

    /// Generates a connection URL from the address and port.
    pub fn connection_url(&self) -> String {
        if self.addr.contains(':') {
            format!("[{}]:{}", self.addr, self.port)
        } else {
            format!("{}:{}", self.addr, self.port)
        }
    }
}

impl Default for UrxDriverConfig {
    fn default() -> Self {
        Self {
            addr: "localhost".to_string(),
            port: DEFAULT_PORT,
            request_timeout_ms: 2000,
            connect_retries: 3,
        }
    }
}
