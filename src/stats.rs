use crate::models::{AppData, DailyLog, LogTotals, TodayResponse, Week, week_id, week_index};
use chrono::{Local, NaiveDate};

pub fn log_totals(log: &DailyLog) -> LogTotals {
    log.tasks.iter().fold(LogTotals::default(), |acc, task| LogTotals {
        planned_minutes: acc.planned_minutes.saturating_add(task.planned_minutes),
        actual_minutes: acc.actual_minutes.saturating_add(task.actual_minutes),
    })
}

pub fn week_totals(week: &Week) -> LogTotals {
    week.logs.iter().map(log_totals).fold(LogTotals::default(), |acc, day| LogTotals {
        planned_minutes: acc.planned_minutes.saturating_add(day.planned_minutes),
        actual_minutes: acc.actual_minutes.saturating_add(day.actual_minutes),
    })
}

/// Share of the best goal reached, in percent, clamped to `0..=100`.
///
/// A best goal of zero counts as one minute.
pub fn progress_percent(log: &DailyLog) -> f64 {
    let actual = f64::from(log_totals(log).actual_minutes);
    let best = f64::from(log.best_goal.max(1));
    (actual / best * 100.0).clamp(0.0, 100.0)
}

/// Today's log and the id of the week owning it.
pub fn today_log(data: &AppData, today: NaiveDate) -> Option<(String, &DailyLog)> {
    data.find_log(today).map(|(index, log)| (week_id(index), log))
}

pub fn build_today(data: &AppData) -> TodayResponse {
    build_today_at(Local::now().date_naive(), data)
}

pub fn build_today_at(today: NaiveDate, data: &AppData) -> TodayResponse {
    let found = today_log(data, today);
    let log = found.as_ref().map(|(_, log)| *log);
    TodayResponse {
        date: today,
        year_goal: data.year_goal.clone(),
        weekly_goal: found
            .as_ref()
            .and_then(|(id, _)| week_index(id))
            .and_then(|index| data.weekly_goal(index)),
        week_id: found.as_ref().map(|(id, _)| id.clone()),
        log: log.cloned(),
        totals: log.map(log_totals),
        progress_percent: log.map(progress_percent).unwrap_or(0.0),
    }
}
