// ── Dashboard totals ──

use serde::Serialize;

use crate::page::Notice;

/// Shown when any of the three totals could not be fetched.
pub const STATS_FAILED: &str = "Failed to load dashboard statistics";
/// Shown when there is no session to fetch with.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// Entity totals shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub campuses: u64,
    pub buildings: u64,
    pub blocks: u64,
}

/// Stats plus the notice to raise, if fetching failed.
///
/// A failure never yields partial numbers: all three fall back to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub notice: Option<Notice>,
}

impl Dashboard {
    pub fn loaded(stats: DashboardStats) -> Self {
        Self {
            stats,
            notice: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            stats: DashboardStats::default(),
            notice: Some(Notice::error(STATS_FAILED)),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            stats: DashboardStats::default(),
            notice: Some(Notice::error(AUTH_REQUIRED)),
        }
    }

    /// Card titles and values in display order.
    pub fn cards(&self) -> [(&'static str, u64); 3] {
        [
            ("Total Campuses", self.stats.campuses),
            ("Total Blocks", self.stats.blocks),
            ("Total Buildings", self.stats.buildings),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failure_zeroes_everything() {
        let d = Dashboard::failed();
        assert_eq!(d.stats, DashboardStats::default());
        assert_eq!(d.notice.unwrap().message, STATS_FAILED);
    }

    #[test]
    fn card_order() {
        let d = Dashboard::loaded(DashboardStats {
            campuses: 3,
            buildings: 40,
            blocks: 12,
        });
        assert_eq!(
            d.cards(),
            [("Total Campuses", 3), ("Total Blocks", 12), ("Total Buildings", 40)]
        );
    }
}
