use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Landing page for the local bridge, linking the docs and route map
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Gym Desk</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'Segoe UI', system-ui, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 40px 20px; }
    .container { max-width: 860px; margin: 0 auto; }
    header { text-align: center; margin-bottom: 40px; }
    header h1 { font-size: 2.6rem; font-weight: 800; color: #f97316; margin-bottom: 8px; }
    header p { color: #94a3b8; font-size: 1.05rem; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 16px; margin-bottom: 32px; }
    .card { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 20px; }
    .card h3 { font-size: 1rem; color: #f1f5f9; margin-bottom: 6px; }
    .card p { font-size: 0.875rem; color: #94a3b8; line-height: 1.5; }
    .card a { color: #fb923c; text-decoration: none; display: inline-block; margin-top: 8px; font-size: 0.875rem; }
    .routes { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 24px; }
    .routes h4 { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.1em; color: #64748b; margin: 16px 0 6px; }
    .routes code { display: block; font-size: 0.85rem; color: #e2e8f0; padding: 3px 0; }
  </style>
</head>
<body>
<div class="container">
  <header>
    <h1>Gym Desk</h1>
    <p>Members, fees, receipts and attendance for a single gym front desk</p>
  </header>

  <div class="grid">
    <div class="card">
      <h3>API Documentation</h3>
      <p>Interactive Swagger UI for every operation.</p>
      <a href="/docs">Open Swagger UI</a>
    </div>
    <div class="card">
      <h3>Health Check</h3>
      <p>Confirms the local database is reachable.</p>
      <a href="/health">GET /health</a>
    </div>
  </div>

  <div class="routes">
    <h4>Members &amp; billing</h4>
    <code>POST /api/v1/members</code>
    <code>POST /api/v1/members/{id}/payments</code>
    <code>POST /api/v1/members/{id}/renew</code>
    <code>GET  /api/v1/members/with-due</code>
    <h4>Receipts</h4>
    <code>GET  /api/v1/receipts</code>
    <code>POST /api/v1/receipts/{id}/supersede</code>
    <h4>Front desk</h4>
    <code>POST /api/v1/members/{id}/check-in</code>
    <code>GET  /api/v1/reminders/expiring</code>
    <code>GET  /api/v1/dashboard</code>
  </div>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "gym-desk",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
