use std::collections::HashMap;

use tracing::debug;

use super::task::TaskRecord;

/// The normalized task table for one scheduling pass.
///
/// Keeps rows in input order and indexes them by id. Ids are unique: when the
/// store delivers the same id twice, the first row wins.
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    records: Vec<TaskRecord>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in store order.
    pub fn from_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Append a record. Returns `false` (and keeps the existing row) when the
    /// id is blank or already present.
    pub fn insert(&mut self, record: TaskRecord) -> bool {
        if record.id.is_empty() {
            return false;
        }
        if self.index.contains_key(&record.id) {
            debug!(id = %record.id, "duplicate task id; keeping the first row");
            self.duplicates.push(record.id);
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Input position of a task, used as the final tie-breaker in layouts.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids that appeared more than once in the input.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// The parent reference of `id`, if it names another task in the table.
    ///
    /// Dangling and self references count as "no parent".
    pub fn effective_parent(&self, id: &str) -> Option<&str> {
        let record = self.get(id)?;
        record
            .parent_id
            .as_deref()
            .filter(|p| *p != id && self.contains(p))
    }

    /// The predecessor of `id`, if it names another task in the table.
    pub fn effective_predecessor(&self, id: &str) -> Option<&str> {
        let record = self.get(id)?;
        record
            .predecessor_id
            .as_deref()
            .filter(|p| *p != id && self.contains(p))
    }

    /// Children of every task, each list in input order.
    pub fn children_index(&self) -> HashMap<&str, Vec<&str>> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for record in &self.records {
            if let Some(parent) = self.effective_parent(&record.id) {
                children.entry(parent).or_default().push(record.id.as_str());
            }
        }
        children
    }
}
