use crate::data::{GroupingOutput, GroupingRequest};
use crate::solver;
use axum::{Json, Router, routing::post};

async fn solve_handler(
    Json(request): Json<GroupingRequest>,
) -> Result<Json<GroupingOutput>, (axum::http::StatusCode, String)> {
    match solver::plan_groups(&request) {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((axum::http::StatusCode::BAD_REQUEST, e.to_string())),
    }
}

pub async fn run_server() {
    let app = Router::new().route("/v1/groups/solve", post(solve_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
