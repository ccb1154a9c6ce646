use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tandem_core::utils::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_PORT};

/// Конфигурация сигнального сервера.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Единственный origin, которому разрешен cross-origin доступ.
    pub allowed_origin: String,
    /// Максимум одновременных участников. `None` снимает ограничение.
    pub max_participants: Option<usize>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
            max_participants: Some(2),
        }
    }
}

impl RelayConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        origin == self.allowed_origin
    }
}
