use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TodoId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

pub struct Todo {
    pub id: TodoId,
    name: Option<String>,
    // epoch millis, local clock
    deadline: Option<i64>,
    is_done: bool,
    created_at: i64,
    updated_at: i64,
}

impl Todo {
    pub fn new(id: TodoId) -> Self {
        let now = Local::now().timestamp_millis();
        Self {
            id,
            name: None,
            deadline: None,
            is_done: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Empty labels are kept as `None`.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name.filter(|n| !n.is_empty());
        self.touch();
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.deadline
            .and_then(|ms| Local.timestamp_millis_opt(ms).single())
    }

    pub fn set_deadline(&mut self, deadline: Option<DateTime<Local>>) {
        self.deadline = deadline.map(|d| d.timestamp_millis());
        self.touch();
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn toggle_done(&mut self) {
        self.is_done = !self.is_done;
        self.touch();
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Local::now().timestamp_millis().max(self.created_at);
    }
}
