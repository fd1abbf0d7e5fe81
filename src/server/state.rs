use std::time::Duration;
use crate::server::engine::currency::CurrencyFormat;
use crate::server::handoff::HandoffStore;
use crate::server::model::config::ServerConfig;
use crate::server::validation::ValidationRules;

#[derive(Clone)]
pub(crate) struct AppState {
    rules: ValidationRules,
    currency: CurrencyFormat,
    render_timeout: Duration,
    handoff: HandoffStore,
}

impl AppState {
    pub fn new(config: &ServerConfig, handoff: HandoffStore) -> Self {
        Self {
            rules: config.rules.clone(),
            currency: config.currency.clone(),
            render_timeout: config.render_timeout,
            handoff,
        }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn currency(&self) -> &CurrencyFormat {
        &self.currency
    }

    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    pub fn handoff(&self) -> &HandoffStore {
        &self.handoff
    }
}
