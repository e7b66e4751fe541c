//! `crewplan-planning`
//!
//! **Responsibility:** the capacity planning core.
//!
//! - [`ledger::CapacityLedger`]: team registration and membership writes.
//! - [`assignment::AssignmentManager`]: team↔initiative assignments, keeping
//!   team workload in step and triggering conflict detection.
//! - [`conflicts::ConflictDetector`]: overallocation findings (append-only).
//! - [`timeline::TimelineAnalyzer`]: status counts, dependency-count ranking
//!   and risk classification over roadmap items.
//! - [`projection::CapacityProjector`]: weekly capacity buckets and
//!   recommendations.
//! - [`planner::CapacityPlanner`]: the facade a transport layer calls.

pub mod assignment;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod ledger;
pub mod planner;
pub mod projection;
pub mod report;
pub mod timeline;

pub use assignment::{AssignRequest, AssignmentManager};
pub use config::PlannerConfig;
pub use conflicts::ConflictDetector;
pub use error::{PlanningError, PlanningResult};
pub use ledger::{CapacityLedger, NewMember, NewTeam};
pub use planner::CapacityPlanner;
pub use projection::{
    CapacityProjection, CapacityProjector, Recommendation, RecommendationKind, TeamWeekCapacity,
    WeeklyCapacity,
};
pub use report::TeamAllocation;
pub use timeline::{
    CriticalPathEntry, RiskFactor, RiskImpact, RiskRules, RiskyItem, TimelineAnalysis,
    TimelineAnalyzer, TimelineFilter,
};
