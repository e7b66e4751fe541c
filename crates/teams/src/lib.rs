//! Teams domain module: the capacity ledger.
//!
//! A `Team` carries the shared counters (`capacity`, `current_workload`,
//! `member_count`) every planning operation reads and writes. The counters
//! only ever move through `TeamCommand`s decided by the aggregate, so each
//! change is an incremental, recorded delta.

pub mod member;
pub mod team;

pub use member::{MemberId, TeamMember};
pub use team::{
    AddMember, ChangeMemberCapacity, CommitWorkload, MemberCapacityChanged, MemberJoined,
    MemberLeft, RegisterTeam, ReleaseWorkload, RemoveMember, Team, TeamCommand, TeamEvent,
    TeamId, TeamRegistered, WorkloadCommitted, WorkloadReleased,
};
