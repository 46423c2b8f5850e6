use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const WEEK_COUNT: usize = 52;
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub content: String,
    pub planned_minutes: u32,
    pub actual_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: NaiveDate,
    pub best_goal: u32,
    pub min_goal: u32,
    pub tasks: Vec<Task>,
    pub comment: String,
    pub ai_coach_comment: String,
}

impl DailyLog {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            best_goal: 0,
            min_goal: 0,
            tasks: Vec::new(),
            comment: String::new(),
            ai_coach_comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub id: String,
    pub title: String,
}

/// One week slot. Its id is derived from its position in [`AppData::weeks`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Week {
    pub title: String,
    pub logs: Vec<DailyLog>,
}

/// Root of the journal tree.
///
/// Serialises to the flat `weeklyGoals` / `logs` shape used by storage and
/// export files, with week ids recomputed from position on the way out and
/// checked against position on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "AppDataRecord", into = "AppDataRecord")]
pub struct AppData {
    pub year_goal: String,
    pub start_date: NaiveDate,
    pub weeks: Vec<Week>,
}

impl AppData {
    pub fn weekly_goal(&self, index: usize) -> Option<WeeklyGoal> {
        self.weeks.get(index).map(|week| WeeklyGoal {
            id: week_id(index),
            title: week.title.clone(),
        })
    }

    pub fn weekly_goals(&self) -> Vec<WeeklyGoal> {
        (0..self.weeks.len())
            .filter_map(|index| self.weekly_goal(index))
            .collect()
    }

    /// Finds the log for `date` together with the index of its owning week.
    pub fn find_log(&self, date: NaiveDate) -> Option<(usize, &DailyLog)> {
        self.weeks.iter().enumerate().find_map(|(index, week)| {
            week.logs
                .iter()
                .find(|log| log.date == date)
                .map(|log| (index, log))
        })
    }

    pub(crate) fn find_log_mut(&mut self, date: NaiveDate) -> Option<&mut DailyLog> {
        self.weeks
            .iter_mut()
            .find_map(|week| week.logs.iter_mut().find(|log| log.date == date))
    }
}

pub fn week_id(index: usize) -> String {
    format!("week{}", index + 1)
}

/// Maps `"weekN"` back to its zero-based index.
pub fn week_index(id: &str) -> Option<usize> {
    let number: usize = id.strip_prefix("week")?.parse().ok()?;
    if number == 0 || id != week_id(number - 1) {
        return None;
    }
    Some(number - 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDataRecord {
    year_goal: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    weekly_goals: Vec<WeeklyGoal>,
    logs: WeekLogs,
}

/// `logs` object that keeps its keys in the order they were written, so
/// files list `week1, week2, ...` rather than string order.
#[derive(Debug, Clone, Default)]
struct WeekLogs(Vec<(String, Vec<DailyLog>)>);

impl WeekLogs {
    fn take(&mut self, id: &str) -> Option<Vec<DailyLog>> {
        let position = self.0.iter().position(|(key, _)| key == id)?;
        Some(self.0.remove(position).1)
    }
}

impl Serialize for WeekLogs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, logs)| (id, logs)))
    }
}

impl<'de> Deserialize<'de> for WeekLogs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeekLogsVisitor;

        impl<'de> Visitor<'de> for WeekLogsVisitor {
            type Value = WeekLogs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of week ids to daily logs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<DailyLog>>()? {
                    entries.push(entry);
                }
                Ok(WeekLogs(entries))
            }
        }

        deserializer.deserialize_map(WeekLogsVisitor)
    }
}

impl From<AppData> for AppDataRecord {
    fn from(data: AppData) -> Self {
        let weekly_goals = data.weekly_goals();
        let logs = data
            .weeks
            .into_iter()
            .enumerate()
            .map(|(index, week)| (week_id(index), week.logs))
            .collect();
        Self {
            year_goal: data.year_goal,
            start_date: Some(data.start_date),
            weekly_goals,
            logs: WeekLogs(logs),
        }
    }
}

impl TryFrom<AppDataRecord> for AppData {
    type Error = String;

    fn try_from(mut record: AppDataRecord) -> Result<Self, Self::Error> {
        let mut weeks = Vec::with_capacity(record.weekly_goals.len());
        for (index, goal) in record.weekly_goals.into_iter().enumerate() {
            let expected = week_id(index);
            if goal.id != expected {
                return Err(format!(
                    "weekly goal `{}` is out of place, expected `{expected}`",
                    goal.id
                ));
            }
            let logs = record
                .logs
                .take(&goal.id)
                .ok_or_else(|| format!("week `{}` has no logs", goal.id))?;
            weeks.push(Week {
                title: goal.title,
                logs,
            });
        }
        if let Some((orphan, _)) = record.logs.0.first() {
            return Err(format!("logs for `{orphan}` have no weekly goal"));
        }

        // Files without a start date are anchored at their first log.
        let start_date = record
            .start_date
            .or_else(|| weeks.first()?.logs.first().map(|log| log.date))
            .ok_or_else(|| "missing `startDate` and no logs to infer it from".to_string())?;

        Ok(Self {
            year_goal: record.year_goal,
            start_date,
            weeks,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearGoalRequest {
    pub year_goal: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDateRequest {
    pub start_date: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct WeekTitleRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SidebarState {
    pub open: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogTotals {
    pub planned_minutes: u32,
    pub actual_minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub log: DailyLog,
    pub totals: LogTotals,
    pub generating: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekResponse {
    pub goal: WeeklyGoal,
    pub days: Vec<DayView>,
    pub totals: LogTotals,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub year_goal: String,
    pub week_id: Option<String>,
    pub weekly_goal: Option<WeeklyGoal>,
    pub log: Option<DailyLog>,
    pub totals: Option<LogTotals>,
    pub progress_percent: f64,
}
