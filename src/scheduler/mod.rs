pub mod cooldown;
pub mod link;
pub mod live;
pub mod task_list;

/// Index into the equipped-skill array.
pub type SkillSlot = usize;

pub use cooldown::CooldownTracker;
pub use link::match_requirements;
pub use live::{CancelToken, Clock, KeySink, MacroScheduler, ManualTrigger, SystemClock};
pub use task_list::{SchedulePlan, SchedulingState, Task, TaskListBuilder, TickOutcome};
