//! Planner configuration.

use core::str::FromStr;

use chrono::Duration;
use tracing::warn;

use crewplan_allocation::SeverityThresholds;

use crate::timeline::RiskRules;

/// Tunables for detection, analysis and projection.
///
/// Defaults reproduce the reference behavior; `from_env` lets a deployment
/// override individual values via `CREWPLAN_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Overallocation percentage above which a conflict is `high`.
    pub high_severity_pct: u32,
    /// Overallocation percentage above which a conflict is `medium`.
    pub medium_severity_pct: u32,
    /// Number of items in the dependency-count ranking.
    pub critical_path_len: usize,
    /// Items shorter than this many days can be `tight_timeline`.
    pub tight_timeline_days: i64,
    /// ...when their estimated effort is above this.
    pub tight_timeline_effort: u32,
    /// Items with more dependencies than this are `high_dependencies`.
    pub high_dependency_count: usize,
    /// Projection bucket width.
    pub projection_step_days: u32,
    pub max_recommendations: usize,
    /// Peak utilization (percent) under which a team is reported as having spare capacity.
    pub underutilization_pct: u32,
    /// Suppress repeated overallocation rows for a team within this window.
    /// `None` keeps every detection (append-only, duplicates included).
    pub dedupe_window: Option<Duration>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            high_severity_pct: 20,
            medium_severity_pct: 10,
            critical_path_len: 5,
            tight_timeline_days: 14,
            tight_timeline_effort: 50,
            high_dependency_count: 3,
            projection_step_days: 7,
            max_recommendations: 5,
            underutilization_pct: 50,
            dedupe_window: None,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by any `CREWPLAN_*` environment variables present.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let dedupe_secs = parse_or(
            "CREWPLAN_DEDUPE_WINDOW_SECS",
            lookup("CREWPLAN_DEDUPE_WINDOW_SECS"),
            0i64,
        );
        Self {
            high_severity_pct: setting(
                &lookup,
                "CREWPLAN_HIGH_SEVERITY_PCT",
                defaults.high_severity_pct,
            ),
            medium_severity_pct: setting(
                &lookup,
                "CREWPLAN_MEDIUM_SEVERITY_PCT",
                defaults.medium_severity_pct,
            ),
            critical_path_len: setting(
                &lookup,
                "CREWPLAN_CRITICAL_PATH_LEN",
                defaults.critical_path_len,
            ),
            tight_timeline_days: setting(
                &lookup,
                "CREWPLAN_TIGHT_TIMELINE_DAYS",
                defaults.tight_timeline_days,
            ),
            tight_timeline_effort: setting(
                &lookup,
                "CREWPLAN_TIGHT_TIMELINE_EFFORT",
                defaults.tight_timeline_effort,
            ),
            high_dependency_count: setting(
                &lookup,
                "CREWPLAN_HIGH_DEPENDENCY_COUNT",
                defaults.high_dependency_count,
            ),
            projection_step_days: setting(
                &lookup,
                "CREWPLAN_PROJECTION_STEP_DAYS",
                defaults.projection_step_days,
            )
            .max(1),
            max_recommendations: setting(
                &lookup,
                "CREWPLAN_MAX_RECOMMENDATIONS",
                defaults.max_recommendations,
            ),
            underutilization_pct: setting(
                &lookup,
                "CREWPLAN_UNDERUTILIZATION_PCT",
                defaults.underutilization_pct,
            ),
            dedupe_window: dedupe_window(dedupe_secs),
        }
    }

    pub fn with_severity_thresholds(mut self, high_pct: u32, medium_pct: u32) -> Self {
        self.high_severity_pct = high_pct;
        self.medium_severity_pct = medium_pct;
        self
    }

    pub fn with_critical_path_len(mut self, len: usize) -> Self {
        self.critical_path_len = len;
        self
    }

    pub fn with_projection_step_days(mut self, days: u32) -> Self {
        self.projection_step_days = days.max(1);
        self
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn with_dedupe_window(mut self, window: Duration) -> Self {
        self.dedupe_window = Some(window);
        self
    }

    pub fn severity_thresholds(&self) -> SeverityThresholds {
        SeverityThresholds {
            high_pct: self.high_severity_pct,
            medium_pct: self.medium_severity_pct,
        }
    }

    pub fn risk_rules(&self) -> RiskRules {
        RiskRules {
            tight_timeline_days: self.tight_timeline_days,
            tight_timeline_effort: self.tight_timeline_effort,
            high_dependency_count: self.high_dependency_count,
        }
    }
}

fn dedupe_window(secs: i64) -> Option<Duration> {
    if secs <= 0 {
        return None;
    }
    let window = Duration::try_seconds(secs);
    if window.is_none() {
        warn!(
            key = "CREWPLAN_DEDUPE_WINDOW_SECS",
            value = secs,
            "dedupe window out of range; deduplication disabled"
        );
    }
    window
}

fn setting<T: FromStr + Copy + core::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    parse_or(key, lookup(key), default)
}

fn parse_or<T: FromStr + Copy + core::fmt::Debug>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, ?default, "invalid planner setting; using default");
                default
            }
        },
    }
}
