//! Page-view analytics types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest window the dashboard will aggregate
pub const MAX_RANGE_DAYS: u32 = 365;

/// Request DTO for recording a page view
#[derive(Debug, Clone, Deserialize)]
pub struct PageViewRequest {
    pub path: String,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl PageViewRequest {
    /// Normalizes the path to a leading-slash form without query or fragment
    pub fn normalized_path(&self) -> Option<String> {
        let path = self.path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path.len() > 512 {
            return None;
        }
        if path.starts_with('/') {
            Some(path.to_string())
        } else {
            Some(format!("/{}", path))
        }
    }
}

/// Query params for the analytics dashboard
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

impl AnalyticsQuery {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(30).clamp(1, MAX_RANGE_DAYS)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PathCount {
    pub path: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub views: i64,
}

/// Admin dashboard summary
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub range_days: u32,
    pub total_views: i64,
    pub views_in_range: i64,
    pub unique_sessions_in_range: i64,
    pub top_pages: Vec<PathCount>,
    pub daily: Vec<DailyCount>,
}

/// First day of a `days`-long window ending with `today`
pub fn range_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - chrono::Duration::days(i64::from(days.max(1)) - 1)
}

/// Fills days with no views so the chart has one point per day, oldest first
pub fn fill_missing_days(counts: Vec<DailyCount>, today: NaiveDate, days: u32) -> Vec<DailyCount> {
    range_start(today, days)
        .iter_days()
        .take(days as usize)
        .map(|day| DailyCount {
            day,
            views: counts
                .iter()
                .find(|c| c.day == day)
                .map(|c| c.views)
                .unwrap_or(0),
        })
        .collect()
}
