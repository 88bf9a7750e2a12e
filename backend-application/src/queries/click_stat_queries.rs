use backend_domain::ClickStat;

use crate::AppState;

pub const DEFAULT_CLICK_STAT_LIMIT: usize = 100;
pub const MAX_CLICK_STAT_LIMIT: usize = 1000;

pub fn list_click_stats(state: &AppState, limit: Option<usize>) -> Vec<ClickStat> {
    let limit = limit
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_CLICK_STAT_LIMIT)
        .min(MAX_CLICK_STAT_LIMIT);
    let mut rows = state.click_stats.snapshot();
    rows.truncate(limit);
    rows
}
