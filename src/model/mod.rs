pub mod color;
pub mod project;
pub mod task;
pub mod timeline;

pub use color::ColorChoice;
pub use project::TaskTable;
pub use task::{DependencyKind, ResolvedTask, TaskRecord, TaskStatus, MAX_DURATION_DAYS, NO_PROJECT};
pub use timeline::{Segment, SegmentPhase, TimelineRange};
