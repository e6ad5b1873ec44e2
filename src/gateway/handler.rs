use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::bandit::{ArmId, BanditArm, PoolSnapshot, RestoreReport};
use crate::engine::MatchResult;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::profile::Profile;
use crate::scoring::CategoryWeights;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub candidate: Profile,
    pub role: Profile,
    #[serde(default)]
    pub weights: Option<CategoryWeights>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArmRequest {
    pub id: String,
    #[serde(default)]
    pub similarity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub candidates: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectResponse {
    pub chosen: ArmId,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    pub success: bool,
}

/// Decodes a JSON body, reporting schema errors as `400` with an error body.
pub(crate) fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

pub(crate) fn parse_arm_id(raw: &str) -> Result<ArmId, GatewayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "arm id must not be empty".to_string(),
        ));
    }
    Ok(ArmId::new(trimmed))
}

#[instrument(skip(state, body))]
pub async fn match_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<MatchResult>, GatewayError> {
    let request: MatchRequest = parse_body(body)?;

    let result = state
        .engine
        .compute_match(&request.candidate, &request.role, request.weights.as_ref())
        .await;

    debug!(
        candidate = %request.candidate.name,
        role = %request.role.name,
        score = result.score.value,
        "Match computed"
    );
    Ok(Json(result))
}

#[instrument(skip(state, body))]
pub async fn create_arm_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<BanditArm>, GatewayError> {
    let request: CreateArmRequest = parse_body(body)?;
    let id = parse_arm_id(&request.id)?;

    if let Some(s) = request.similarity
        && !(0.0..=1.0).contains(&s)
    {
        warn!(arm = %id, similarity = s, "Similarity outside [0, 1]; clamping");
    }

    Ok(Json(state.engine.initialize_arm(&id, request.similarity)))
}

#[instrument(skip(state))]
pub async fn get_arm_handler(
    State(state): State<HandlerState>,
    Path(id): Path<String>,
) -> Result<Json<BanditArm>, GatewayError> {
    let id = parse_arm_id(&id)?;
    state
        .engine
        .get_arm(&id)
        .map(Json)
        .ok_or_else(|| GatewayError::NotFound(format!("arm {}", id)))
}

#[instrument(skip(state, body))]
pub async fn select_arm_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SelectResponse>, GatewayError> {
    let request: SelectRequest = parse_body(body)?;
    let candidates = request
        .candidates
        .iter()
        .map(|c| parse_arm_id(c))
        .collect::<Result<Vec<_>, _>>()?;

    let chosen = state.engine.choose_best_arm(&candidates)?;
    debug!(chosen = %chosen, candidates = candidates.len(), "Arm selected");
    Ok(Json(SelectResponse { chosen }))
}

#[instrument(skip(state, body))]
pub async fn record_outcome_handler(
    State(state): State<HandlerState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<BanditArm>, GatewayError> {
    let request: OutcomeRequest = parse_body(body)?;
    let id = parse_arm_id(&id)?;

    Ok(Json(state.engine.record_outcome(&id, request.success)))
}

#[instrument(skip(state))]
pub async fn export_pool_handler(State(state): State<HandlerState>) -> Json<PoolSnapshot> {
    Json(state.engine.export_snapshot())
}

#[instrument(skip(state, body))]
pub async fn import_pool_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<RestoreReport>, GatewayError> {
    let snapshot: PoolSnapshot = parse_body(body)?;
    let report = state.engine.import_snapshot(&snapshot)?;

    info!(
        inserted = report.inserted,
        overwritten = report.overwritten,
        kept_fresher = report.kept_fresher,
        "Pool import applied"
    );
    Ok(Json(report))
}
