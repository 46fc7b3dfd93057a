// Application state module
// Read-only state shared by every request: configuration plus outbound clients

use super::types::Config;
use crate::voting::VotingWindow;

/// Application state
///
/// Built once at start-up and handed to each request behind an `Arc`.
/// Nothing in here is mutated after construction.
pub struct AppState<S, V> {
    pub config: Config,
    pub voting: VotingWindow,
    pub store: S,
    pub captcha: V,
}

impl<S, V> AppState<S, V> {
    pub fn new(config: Config, store: S, captcha: V) -> Self {
        let voting = VotingWindow::new(config.voting.end_timestamp);

        Self {
            config,
            voting,
            store,
            captcha,
        }
    }
}
