use crate::days::is_palette_tag;
use crate::errors::{AppError, StoreError};
use crate::models::{
    DayCardResponse, OverviewResponse, ProgressRecord, ReactionRequest, UidQuery, UidRequest,
    UserId,
};
use crate::overview::{build_day_card_at, build_overview_at};
use crate::state::AppState;
use crate::ui::{Page, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, warn};

enum Action {
    Complete,
    ToggleFavorite,
    React(String),
}

pub async fn index(State(state): State<AppState>, Query(query): Query<UidQuery>) -> Response {
    let uid = match parse_uid(&query.uid) {
        Ok(uid) => uid,
        Err(err) => return err.into_response(),
    };
    let (record, notice) = match load_visit(&state, &uid).await {
        Ok(record) => (record, None),
        Err(err) => {
            error!(%uid, "failed to load progress: {err}");
            (ProgressRecord::empty(), Some(format!("Could not load progress: {err}")))
        }
    };
    render_page(&state, &uid, &record, &query, notice.as_deref()).into_response()
}

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<UidQuery>,
) -> Result<Json<OverviewResponse>, AppError> {
    let uid = parse_uid(&query.uid)?;
    let record = load_visit(&state, &uid).await?;
    Ok(Json(overview(&state, &uid, &record)))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Query(query): Query<UidQuery>,
) -> Result<Json<DayCardResponse>, AppError> {
    let uid = parse_uid(&query.uid)?;
    let record = load_visit(&state, &uid).await?;
    build_day_card_at(state.clock.today(), &state.policy, &record, day)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no day {day}")))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Json(payload): Json<UidRequest>,
) -> Result<Json<OverviewResponse>, AppError> {
    apply_json(&state, &payload.uid, day, Action::Complete).await
}

pub async fn favorite(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Json(payload): Json<UidRequest>,
) -> Result<Json<OverviewResponse>, AppError> {
    apply_json(&state, &payload.uid, day, Action::ToggleFavorite).await
}

pub async fn react(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Json(payload): Json<ReactionRequest>,
) -> Result<Json<OverviewResponse>, AppError> {
    apply_json(&state, &payload.uid, day, Action::React(payload.tag)).await
}

pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<UidRequest>,
) -> Result<Json<OverviewResponse>, AppError> {
    let uid = parse_uid(&payload.uid)?;
    state.service.reset(&uid).await?;
    Ok(Json(overview(&state, &uid, &ProgressRecord::empty())))
}

pub async fn complete_form(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Form(form): Form<UidRequest>,
) -> Response {
    apply_form(&state, &form.uid, day, Action::Complete).await
}

pub async fn favorite_form(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Form(form): Form<UidRequest>,
) -> Response {
    apply_form(&state, &form.uid, day, Action::ToggleFavorite).await
}

pub async fn react_form(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Form(form): Form<ReactionRequest>,
) -> Response {
    apply_form(&state, &form.uid, day, Action::React(form.tag)).await
}

pub async fn reset_form(State(state): State<AppState>, Form(form): Form<UidRequest>) -> Response {
    let uid = match parse_uid(&form.uid) {
        Ok(uid) => uid,
        Err(err) => return err.into_response(),
    };
    match state.service.reset(&uid).await {
        Ok(()) => Redirect::to(&format!("/?uid={uid}")).into_response(),
        Err(err) => {
            error!(%uid, "failed to reset progress: {err}");
            AppError::from(err).into_response()
        }
    }
}

async fn apply_json(
    state: &AppState,
    raw_uid: &str,
    day: u32,
    action: Action,
) -> Result<Json<OverviewResponse>, AppError> {
    let uid = parse_uid(raw_uid)?;
    check(state, day, &action)?;
    let mut record = state.service.load(&uid).await?;
    apply(state, &mut record, day, action)?;
    let saved = state.service.save(&uid, &record).await.map_err(|err| {
        error!(%uid, day, "failed to save progress: {err}");
        AppError::from(err)
    })?;
    Ok(Json(overview(state, &uid, &saved)))
}

/// Redirects back to the card on success. Store failures re-render the page
/// with a notice; a failed save keeps the user's unsaved change applied so
/// they can retry.
async fn apply_form(state: &AppState, raw_uid: &str, day: u32, action: Action) -> Response {
    let uid = match parse_uid(raw_uid) {
        Ok(uid) => uid,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = check(state, day, &action) {
        return err.into_response();
    }
    let mut record = match state.service.load(&uid).await {
        Ok(record) => record,
        Err(err) => {
            error!(%uid, day, "failed to load progress: {err}");
            let notice = format!("Could not load progress: {err}");
            return failure_page(state, &uid, &ProgressRecord::empty(), day, &notice, err);
        }
    };
    if let Err(err) = apply(state, &mut record, day, action) {
        return err.into_response();
    }
    match state.service.save(&uid, &record).await {
        Ok(_) => Redirect::to(&format!("/?uid={uid}&day={day}")).into_response(),
        Err(err) => {
            error!(%uid, day, "failed to save progress: {err}");
            let notice = format!("Could not save: {err}");
            failure_page(state, &uid, &record, day, &notice, err)
        }
    }
}

fn failure_page(
    state: &AppState,
    uid: &UserId,
    record: &ProgressRecord,
    day: u32,
    notice: &str,
    err: StoreError,
) -> Response {
    let query = UidQuery {
        uid: uid.to_string(),
        day: Some(day),
        view: None,
    };
    let mut response = render_page(state, uid, record, &query, Some(notice)).into_response();
    *response.status_mut() = AppError::from(err).status;
    response
}

/// Rejects unknown days and reactions outside the palette before any store
/// round trip.
fn check(state: &AppState, day: u32, action: &Action) -> Result<(), AppError> {
    if !state.policy.contains(day) {
        return Err(AppError::not_found(format!("no day {day}")));
    }
    if let Action::React(tag) = action {
        if !is_palette_tag(tag) {
            return Err(AppError::bad_request(format!("'{tag}' is not a reaction")));
        }
    }
    Ok(())
}

/// Applies the change in memory once the day is known to be unlocked.
fn apply(
    state: &AppState,
    record: &mut ProgressRecord,
    day: u32,
    action: Action,
) -> Result<(), AppError> {
    let today = state.clock.today();
    if !state.policy.is_unlocked(record, today, day) {
        return Err(AppError::bad_request(format!("day {day} is still locked")));
    }

    state.policy.stamp_first_visit(record, today);
    match action {
        Action::Complete => record.mark_completed(day),
        Action::ToggleFavorite => {
            record.toggle_favorite(day);
        }
        Action::React(tag) => record.set_reaction(day, tag),
    }
    Ok(())
}

/// Loads progress for a page or API read. In per-user mode the first visit
/// is written straight away so the user's day 1 is the day they arrived.
/// A failed write is logged and the stamped record is still served.
async fn load_visit(state: &AppState, uid: &UserId) -> Result<ProgressRecord, StoreError> {
    let mut record = state.service.load(uid).await?;
    if !state.policy.stamp_first_visit(&mut record, state.clock.today()) {
        return Ok(record);
    }
    match state.service.save(uid, &record).await {
        Ok(saved) => Ok(saved),
        Err(err) => {
            warn!(%uid, "failed to record first visit: {err}");
            Ok(record)
        }
    }
}

fn render_page(
    state: &AppState,
    uid: &UserId,
    record: &ProgressRecord,
    query: &UidQuery,
    notice: Option<&str>,
) -> Html<String> {
    let today = state.clock.today();
    let overview = overview(state, uid, record);
    let selected = query
        .day
        .unwrap_or_else(|| state.policy.today_selection(record, today))
        .clamp(1, state.policy.total_days);
    let card = build_day_card_at(today, &state.policy, record, selected);

    Html(render_index(&Page {
        overview: &overview,
        card: card.as_ref(),
        show_history: query.view.as_deref() == Some("history"),
        notice,
    }))
}

fn overview(state: &AppState, uid: &UserId, record: &ProgressRecord) -> OverviewResponse {
    build_overview_at(state.clock.today(), &state.policy, uid, record)
}

fn parse_uid(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw).ok_or_else(|| {
        AppError::bad_request("uid must be 1-128 letters, digits, '-' or '_'")
    })
}
