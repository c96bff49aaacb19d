//! Task board: the task store seen through the calendar.

use std::collections::BTreeMap;
use std::sync::Arc;

use galeria_core::calendar::CalendarIndex;
use galeria_core::task::Task;

use crate::entity_store::EntityStore;

/// Calendar lookups over active tasks. Soft-deleted tasks stay off the grid.
pub struct TaskBoard {
    store: Arc<EntityStore<Task>>,
    calendar: CalendarIndex,
}

impl TaskBoard {
    pub fn new(store: Arc<EntityStore<Task>>, calendar: CalendarIndex) -> Self {
        Self { store, calendar }
    }

    pub fn store(&self) -> &Arc<EntityStore<Task>> {
        &self.store
    }

    pub fn calendar(&self) -> CalendarIndex {
        self.calendar
    }

    /// Tasks on `year`/`month_index`/`day`, `month_index` zero-based.
    pub async fn by_date(&self, year: i32, month_index: u32, day: u32) -> Vec<Task> {
        let tasks = self.store.list_active().await;
        self.calendar
            .by_date(&tasks, year, month_index, day)
            .into_iter()
            .cloned()
            .collect()
    }

    /// A month grid: day of month to that day's tasks.
    pub async fn by_month(&self, year: i32, month_index: u32) -> BTreeMap<u32, Vec<Task>> {
        let tasks = self.store.list_active().await;
        self.calendar
            .by_month(&tasks, year, month_index)
            .into_iter()
            .map(|(day, tasks)| (day, tasks.into_iter().cloned().collect()))
            .collect()
    }

    pub async fn search(&self, query: &str) -> Vec<Task> {
        self.store.search(query).await
    }
}
