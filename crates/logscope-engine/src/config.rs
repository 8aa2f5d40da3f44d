use chrono::{DateTime, TimeDelta, Utc};

use logscope_types::DisplayTimezone;

/// Settings the explorer starts with
#[derive(Clone, Debug)]
pub struct ExplorerConfig {
    /// Length of the initial query window
    pub initial_window: TimeDelta,

    /// End of the initial window; `None` means "now" at start-up
    pub anchor: Option<DateTime<Utc>>,

    /// Timezone record times are rendered in
    pub display_timezone: DisplayTimezone,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            initial_window: TimeDelta::minutes(10),
            anchor: None,
            display_timezone: DisplayTimezone::Utc,
        }
    }
}
