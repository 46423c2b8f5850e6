//! Building and editing the journal tree.
//!
//! Every mutator takes the tree by value and hands back the edited tree, so a
//! caller can never observe an edit through a stale handle. Edits aimed at a
//! week, log or task that does not exist return the tree untouched.

use crate::models::{
    AppData, DAYS_PER_WEEK, DailyLog, Task, WEEK_COUNT, Week, WeeklyGoal, week_index,
};
use chrono::{Days, NaiveDate, Utc};

/// Last date covered by a tree starting at `start`, if it is representable.
pub fn last_date(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_days(Days::new((WEEK_COUNT * DAYS_PER_WEEK - 1) as u64))
}

/// Builds a fresh tree of 52 empty weeks starting at `start`.
pub fn generate(start: NaiveDate) -> AppData {
    let mut days = start.iter_days();
    let weeks = (0..WEEK_COUNT)
        .map(|_| Week {
            title: String::new(),
            logs: days.by_ref().take(DAYS_PER_WEEK).map(DailyLog::empty).collect(),
        })
        .collect();

    AppData {
        year_goal: String::new(),
        start_date: start,
        weeks,
    }
}

pub fn set_year_goal(mut data: AppData, goal: impl Into<String>) -> AppData {
    data.year_goal = goal.into();
    data
}

pub fn set_week_title(mut data: AppData, week_id: &str, title: impl Into<String>) -> AppData {
    if let Some(week) = week_index(week_id).and_then(|index| data.weeks.get_mut(index)) {
        week.title = title.into();
    }
    data
}

pub fn replace_weekly_goal(data: AppData, goal: WeeklyGoal) -> AppData {
    set_week_title(data, &goal.id, goal.title)
}

/// Replaces the log whose date matches `log.date`.
pub fn update_log(mut data: AppData, log: DailyLog) -> AppData {
    if let Some(slot) = data.find_log_mut(log.date) {
        *slot = log;
    }
    data
}

pub fn delete_task(mut data: AppData, date: NaiveDate, task_id: &str) -> AppData {
    if let Some(log) = data.find_log_mut(date) {
        log.tasks.retain(|task| task.id != task_id);
    }
    data
}

pub fn set_ai_comment(mut data: AppData, date: NaiveDate, comment: impl Into<String>) -> AppData {
    if let Some(log) = data.find_log_mut(date) {
        log.ai_coach_comment = comment.into();
    }
    data
}

/// Appends an empty task to `log`.
pub fn add_task(mut log: DailyLog) -> DailyLog {
    log.tasks.push(Task {
        id: new_task_id(),
        content: String::new(),
        planned_minutes: 0,
        actual_minutes: 0,
    });
    log
}

fn new_task_id() -> String {
    format!(
        "task-{}-{}",
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}
