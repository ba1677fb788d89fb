//! Record structs consumed from the external data store.
//!
//! Records are created by the import process and are read-only to Tempo.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema validation.

mod allocation;
mod milestone;
mod project;
mod skill;
mod work_record;

pub use allocation::PlannedAllocation;
pub use milestone::{Milestone, MilestoneGate};
pub use project::Project;
pub use skill::{SkillRating, SkillRequirement};
pub use work_record::WorkRecord;
