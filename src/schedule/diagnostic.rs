use std::fmt;

use serde::{Deserialize, Serialize};

/// Something in the task table the scheduler had to work around.
///
/// Diagnostics never stop a scheduling pass; they explain why a task ended up
/// with the dates it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A later row reused an id; it was dropped.
    DuplicateId { task: String },
    /// `parent_id` names a task that is not in the table.
    MissingParent { task: String, parent: String },
    /// `predecessor_id` names a task that is not in the table.
    MissingPredecessor { task: String, predecessor: String },
    /// A task names itself as parent or predecessor.
    SelfReference { task: String },
    /// `task` was still being resolved when `via` needed it; `via` used the
    /// fallback interval for `task` instead.
    CycleBroken { task: String, via: String },
}

impl Diagnostic {
    pub fn is_cycle(&self) -> bool {
        matches!(self, Diagnostic::CycleBroken { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateId { task } => {
                write!(f, "task id '{task}' appears more than once; later rows ignored")
            }
            Diagnostic::MissingParent { task, parent } => {
                write!(f, "task '{task}' names unknown parent '{parent}'; treated as top-level")
            }
            Diagnostic::MissingPredecessor { task, predecessor } => write!(
                f,
                "task '{task}' names unknown predecessor '{predecessor}'; treated as independent"
            ),
            Diagnostic::SelfReference { task } => {
                write!(f, "task '{task}' references itself; reference ignored")
            }
            Diagnostic::CycleBroken { task, via } => write!(
                f,
                "reference cycle through '{task}' (reached from '{via}'); fallback dates used"
            ),
        }
    }
}
