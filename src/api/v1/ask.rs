//! Question answering endpoint

use axum::extract::State;
use tracing::{error, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, AskRequest, AskResponse, Json};

/// Run a question through the workflow and return the final state
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let run = state.executor.run(&request.user_query).await.map_err(|e| {
        error!(error = %e, "Workflow run failed");
        ApiError::from(e)
    })?;

    info!(
        planner_decision = run.state.planner_decision(),
        execution_time_ms = run.execution_time_ms,
        "Question answered"
    );

    Ok(Json(AskResponse::from(run)))
}
