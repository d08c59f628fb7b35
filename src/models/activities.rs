use chrono::{NaiveDate, NaiveTime};

use crate::services::schedule::ActivityWindow;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivitiesRow {
    pub activity_id: String,
    pub title: String,
    pub description: String,
    pub activity_type: String,
    pub price: i64,
    pub max_participants: i64,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub is_active: i64,
    pub created_by: Option<String>,
}

impl ActivitiesRow {
    pub fn is_active(&self) -> bool {
        self.is_active == 1
    }

    pub fn is_paid(&self) -> bool {
        self.activity_type == ActivityKind::Paid.as_str()
    }

    pub fn window(&self) -> ActivityWindow {
        ActivityWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Slim projection used for schedule-conflict checks: just enough of an
/// activity to build its window and name it in an error message.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityScheduleRow {
    pub activity_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ActivityScheduleRow {
    pub fn window(&self) -> ActivityWindow {
        ActivityWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Free,
    Paid,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Free => "free",
            ActivityKind::Paid => "paid",
        }
    }
}

/// Lifecycle: Draft -> Published -> Full / Cancelled / Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Draft,
    Published,
    Full,
    Cancelled,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Draft => "Draft",
            ActivityStatus::Published => "Published",
            ActivityStatus::Full => "Full",
            ActivityStatus::Cancelled => "Cancelled",
            ActivityStatus::Completed => "Completed",
        }
    }
}
