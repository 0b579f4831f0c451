use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    models::WorkModel,
    types::{ReactRequest, ReactionResponse, SubmitWorkRequest},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for submitting a work
///
/// POST /works
#[instrument(name = "submit_work", skip(state, request))]
pub async fn submit_work(
    State(state): State<AppState>,
    Json(request): Json<SubmitWorkRequest>,
) -> Result<Json<WorkModel>, AppError> {
    let work = state.work_service.submit_work(request).await?;
    info!(work_id = %work.id, author_id = %work.author_id, "Work created");
    Ok(Json(work))
}

/// HTTP handler for reacting to a work
///
/// POST /works/:work_id/reactions
#[instrument(name = "react_to_work", skip(state, request))]
pub async fn react_to_work(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
    Json(request): Json<ReactRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let response = state
        .work_service
        .react(&work_id, &request.contributor_id, request.polarity)
        .await?;
    Ok(Json(response))
}

/// DELETE /works/:work_id/reactions/:contributor_id
#[instrument(name = "remove_reaction", skip(state))]
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path((work_id, contributor_id)): Path<(String, String)>,
) -> Result<Json<ReactionResponse>, AppError> {
    let response = state
        .work_service
        .remove_reaction(&work_id, &contributor_id)
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::{models::ContributorModel, repository::InMemoryContributorRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(contributors: Vec<ContributorModel>) -> Router {
        let state = AppStateBuilder::new()
            .with_contributor_repository(Arc::new(
                InMemoryContributorRepository::with_contributors(contributors),
            ))
            .build();

        Router::new()
            .route("/works", post(submit_work))
            .route("/works/:work_id/reactions", post(react_to_work))
            .with_state(state)
    }

    fn json_request(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_and_react() {
        let author = ContributorModel::new("author".to_string(), None);
        let reader = ContributorModel::new("reader".to_string(), None);
        let app = app(vec![author.clone(), reader.clone()]);

        let body = format!(
            r#"{{"author_id": "{}", "title": "Barish", "content": "boondein"}}"#,
            author.id
        );
        let response = app
            .clone()
            .oneshot(json_request("/works", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let work: WorkModel = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(work.language, "english");

        let body = format!(
            r#"{{"contributor_id": "{}", "polarity": "like"}}"#,
            reader.id
        );
        let response = app
            .oneshot(json_request(&format!("/works/{}/reactions", work.id), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let reaction: ReactionResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reaction.positive_count, 1);
        assert_eq!(reaction.change, "inserted");
    }

    #[tokio::test]
    async fn test_react_to_missing_work_is_not_found() {
        let reader = ContributorModel::new("reader".to_string(), None);
        let app = app(vec![reader.clone()]);

        let body = format!(
            r#"{{"contributor_id": "{}", "polarity": "dislike"}}"#,
            reader.id
        );
        let response = app
            .oneshot(json_request("/works/missing/reactions", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_polarity_is_rejected() {
        let app = app(vec![]);

        let body = r#"{"contributor_id": "x", "polarity": "love"}"#.to_string();
        let response = app
            .oneshot(json_request("/works/any/reactions", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
