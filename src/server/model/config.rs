use std::net::SocketAddrV4;
use std::time::Duration;
use crate::server::engine::currency::CurrencyFormat;
use crate::server::validation::ValidationRules;

pub const DEFAULT_HANDOFF_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Server configs
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddrV4,
    /// which header fields must be filled in before rendering
    pub rules: ValidationRules,
    pub currency: CurrencyFormat,
    /// how long an untaken hand-off slot lives
    pub handoff_ttl: Duration,
    pub render_timeout: Duration,
}

impl ServerConfig {
    pub fn new(addr: SocketAddrV4) -> Self {
        Self {
            addr,
            rules: ValidationRules::default(),
            currency: CurrencyFormat::default(),
            handoff_ttl: DEFAULT_HANDOFF_TTL,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_handoff_ttl(mut self, ttl: Duration) -> Self {
        self.handoff_ttl = ttl;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }
}
