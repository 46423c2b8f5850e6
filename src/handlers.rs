use crate::errors::AppError;
use crate::models::{
    AppData, DailyLog, DayView, ImportQuery, SidebarState, StartDateRequest, TodayResponse,
    WeekResponse, WeekTitleRequest, YearGoalRequest, week_index,
};
use crate::sheet;
use crate::state::AppState;
use crate::stats::{build_today, log_totals, week_totals};
use crate::transfer::{export_file_name, export_json, parse_import};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

pub async fn index() -> Html<&'static str> {
    Html(render_index())
}

pub async fn get_sheet(State(state): State<AppState>) -> Json<AppData> {
    Json(state.data.lock().await.clone())
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let data = state.data.lock().await;
    Json(build_today(&data))
}

pub async fn put_year_goal(
    State(state): State<AppState>,
    Json(payload): Json<YearGoalRequest>,
) -> Json<AppData> {
    Json(apply(&state, |data| sheet::set_year_goal(data, payload.year_goal)).await)
}

pub async fn put_start_date(
    State(state): State<AppState>,
    Json(payload): Json<StartDateRequest>,
) -> Result<Json<AppData>, AppError> {
    let start = parse_date(&payload.start_date)?;
    if sheet::last_date(start).is_none() {
        return Err(AppError::bad_request("start date is out of range"));
    }
    if !payload.confirm {
        return Ok(Json(state.data.lock().await.clone()));
    }

    info!(%start, "regenerating sheet for new start date");
    Ok(Json(apply(&state, |_| sheet::generate(start)).await))
}

pub async fn get_week(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
) -> Result<Json<WeekResponse>, AppError> {
    let data = state.data.lock().await;
    let index = known_week(&data, &week_id)?;
    let week = &data.weeks[index];

    let days = week
        .logs
        .iter()
        .map(|log| DayView {
            log: log.clone(),
            totals: log_totals(log),
            generating: state.coaching.contains(log.date),
        })
        .collect();

    Ok(Json(WeekResponse {
        goal: data
            .weekly_goal(index)
            .ok_or_else(|| AppError::not_found(format!("unknown week `{week_id}`")))?,
        days,
        totals: week_totals(week),
    }))
}

pub async fn put_week_title(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(payload): Json<WeekTitleRequest>,
) -> Result<Json<AppData>, AppError> {
    known_week(&*state.data.lock().await, &week_id)?;
    Ok(Json(
        apply(&state, |data| sheet::set_week_title(data, &week_id, payload.title)).await,
    ))
}

pub async fn put_log(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(log): Json<DailyLog>,
) -> Result<Json<DailyLog>, AppError> {
    let date = parse_date(&date)?;
    if log.date != date {
        return Err(AppError::bad_request("log date does not match the path"));
    }
    known_log(&*state.data.lock().await, date)?;

    let data = apply(&state, |data| sheet::update_log(data, log)).await;
    Ok(Json(known_log(&data, date)?))
}

pub async fn add_task(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyLog>, AppError> {
    let date = parse_date(&date)?;
    known_log(&*state.data.lock().await, date)?;

    let data = apply(&state, |data| {
        let log = data.find_log(date).map(|(_, log)| log.clone());
        match log {
            Some(log) => sheet::update_log(data, sheet::add_task(log)),
            None => data,
        }
    })
    .await;
    Ok(Json(known_log(&data, date)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((date, task_id)): Path<(String, String)>,
) -> Result<Json<DailyLog>, AppError> {
    let date = parse_date(&date)?;
    known_log(&*state.data.lock().await, date)?;

    let data = apply(&state, |data| sheet::delete_task(data, date, &task_id)).await;
    Ok(Json(known_log(&data, date)?))
}

pub async fn request_coach(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyLog>, AppError> {
    let date = parse_date(&date)?;
    let (log, goal) = {
        let data = state.data.lock().await;
        let (index, log) = data
            .find_log(date)
            .ok_or_else(|| AppError::not_found(format!("no log for {date}")))?;
        let goal = data
            .weekly_goal(index)
            .ok_or_else(|| AppError::not_found(format!("no week for {date}")))?;
        (log.clone(), goal)
    };

    let _guard = state
        .coaching
        .try_begin(date)
        .ok_or_else(|| {
            AppError::conflict(format!("a coach comment for {date} is already being generated"))
        })?;

    // The tree stays unlocked while the provider is working.
    let comment = state.coach.comment(&log, &goal).await;

    let data = apply(&state, |data| sheet::set_ai_comment(data, date, comment)).await;
    Ok(Json(known_log(&data, date)?))
}

pub async fn get_coaching(State(state): State<AppState>) -> Json<Vec<NaiveDate>> {
    Json(state.coaching.snapshot())
}

pub async fn get_sidebar(State(state): State<AppState>) -> Json<SidebarState> {
    Json(SidebarState {
        open: *state.sidebar_open.lock().await,
    })
}

pub async fn put_sidebar(
    State(state): State<AppState>,
    Json(payload): Json<SidebarState>,
) -> Json<SidebarState> {
    let mut open = state.sidebar_open.lock().await;
    *open = payload.open;
    if let Err(err) = state.store.persist_sidebar(*open).await {
        error!("failed to persist sidebar state: {err}");
    }
    Json(SidebarState { open: *open })
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = export_json(&*state.data.lock().await)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Local::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<AppData>, AppError> {
    if !query.confirm {
        return Ok(Json(state.data.lock().await.clone()));
    }

    let imported = parse_import(&body).map_err(|err| {
        warn!("import rejected: {err}");
        AppError::bad_request(err.user_message())
    })?;

    info!(start = %imported.start_date, "importing sheet");
    Ok(Json(apply(&state, |_| imported).await))
}

/// Swaps in the edited tree and writes it through to the store. A failed
/// write is logged and the in-memory edit stands.
async fn apply(state: &AppState, edit: impl FnOnce(AppData) -> AppData) -> AppData {
    let mut data = state.data.lock().await;
    *data = edit(std::mem::take(&mut *data));
    if let Err(err) = state.store.persist_data(&data).await {
        error!("failed to persist sheet: {err}");
    }
    data.clone()
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("`{value}` is not a YYYY-MM-DD date")))
}

fn known_week(data: &AppData, week_id: &str) -> Result<usize, AppError> {
    week_index(week_id)
        .filter(|index| *index < data.weeks.len())
        .ok_or_else(|| AppError::not_found(format!("unknown week `{week_id}`")))
}

fn known_log(data: &AppData, date: NaiveDate) -> Result<DailyLog, AppError> {
    data.find_log(date)
        .map(|(_, log)| log.clone())
        .ok_or_else(|| AppError::not_found(format!("no log for {date}")))
}
