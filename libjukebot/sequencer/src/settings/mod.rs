use std::time::Duration;

#[derive(Clone, Copy, Debug, Default)]
pub struct Settings {
    /// Maximum time to wait for one resolution before treating the item as
    /// failed. `None` lets a slow download delay its item indefinitely, which
    /// matches the historical behavior.
    pub resolve_timeout: Option<Duration>,
}
