use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use dotenvy::dotenv;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::{collections::HashMap, env, net::SocketAddr};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kemahasiswaan_portal::{
    auth::{issue_token, AuthClaims},
    auth_ops::validate_login,
    chatbot,
    db::{connect_pool, upsert_admin_by_sub, DbConfig},
    manage_achievements, manage_aspirations, manage_carousel, manage_meta, password_reset,
    services::{InMemoryService, PortalContext, PortalError},
    uploads::AttachmentField,
};

#[derive(Clone)]
struct AppState {
    db: PgPool,
    portal: InMemoryService,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let db_config = DbConfig::from_env();
    let db = connect_pool(&db_config).expect("failed to configure postgres pool");

    let portal = InMemoryService::new_with_sample();
    let state = AppState { db, portal };
    let app = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/api/achievements", get(achievements_index).post(achievements_store))
        .route(
            "/api/achievements/:id",
            post(achievements_update).delete(achievements_destroy),
        )
        .route("/api/carousel/:id/toggle", post(carousel_toggle))
        .route("/api/aspirations", get(aspirations_index).post(aspirations_submit))
        .route("/api/chatbot", post(chatbot_answer))
        .route("/api/meta/:page_key", get(meta_show))
        .with_state(state);

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".into())
        .parse()
        .expect("invalid BIND_ADDR, expected host:port");
    info!("portal API listening on http://{addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server crashed");
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn admin_context(claims: &AuthClaims) -> PortalContext {
    let mut ctx = PortalContext::default();
    ctx.user_info.id = claims.sub.parse().unwrap_or(0);
    ctx.user_info.name = claims.name.clone();
    ctx.user_info.is_guest = false;
    ctx.user_info.is_admin = true;
    ctx
}

fn apply_fields(ctx: &mut PortalContext, fields: &Value) {
    if let Some(map) = fields.as_object() {
        for (key, value) in map {
            ctx.post_vars.set(key, value.clone());
        }
    }
}

fn error_response(error: PortalError) -> (StatusCode, Json<Value>) {
    match error {
        PortalError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "error", "errors": errors })),
        ),
        PortalError::PermissionDenied(what) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "status": "error", "message": what })),
        ),
        PortalError::SessionTimeout => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "error", "message": "session timeout" })),
        ),
        PortalError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": what })),
        ),
        PortalError::Internal(message) => {
            error!(error = %message, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": message })),
            )
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match sqlx::query_scalar::<_, i32>("select 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => json!({"status": "ok"}),
        Err(err) => {
            error!(error = %err, "database connectivity check failed");
            json!({"status": "error", "message": err.to_string()})
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "service": "ok",
            "db": db_status,
            "timestamp": Utc::now()
        })),
    )
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let mut ctx = PortalContext::default();
    match validate_login(&state.portal, &mut ctx, &payload.email, &payload.password) {
        Ok(admin) => {
            if let Err(err) = upsert_admin_by_sub(&state.db, &admin.id.to_string(), &admin.name).await
            {
                error!(error = %err, "failed to sync admin row");
            }
            let secret = match env::var("JWT_SECRET") {
                Ok(secret) => secret,
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"status": "error", "message": "jwt secret not configured"})),
                    )
                        .into_response()
                }
            };
            match issue_token(admin.id, &admin.name, &secret) {
                Ok(token) => (
                    StatusCode::OK,
                    Json(json!({
                        "status": "ok",
                        "token": token,
                        "admin": { "id": admin.id, "name": admin.name }
                    })),
                )
                    .into_response(),
                Err(err) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error", "message": err.to_string()})),
                )
                    .into_response(),
            }
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": "email atau kata sandi salah"})),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct ForgotPasswordPayload {
    email: String,
}

/// Always answers ok; whether the address exists is not revealed. The signed
/// link lands in the server log for the mail relay to pick up.
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> impl IntoResponse {
    let mut ctx = PortalContext::default();
    ctx.scripturl = env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".into());
    match password_reset::request_reset(&state.portal, &mut ctx, &payload.email) {
        Ok(()) => {
            if let Some(link) = ctx.context.string("reset_link") {
                info!(link, "password reset link issued");
            }
            (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
        }
        Err(error) => error_response(error).into_response(),
    }
}

#[derive(Deserialize)]
struct ResetPasswordPayload {
    id: i64,
    token: String,
    password: String,
}

async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> impl IntoResponse {
    let mut ctx = PortalContext::default();
    match password_reset::redeem_reset(
        &state.portal,
        &mut ctx,
        payload.id,
        &payload.token,
        &payload.password,
    ) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn achievements_index(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    if let Some(search) = params.get("search") {
        ctx.request.set("search", search);
    }
    if let Some(direction) = params.get("direction") {
        ctx.request.set("direction", direction);
    }
    match manage_achievements::list_achievements(&state.portal, &mut ctx) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "achievements": ctx.context.get("achievements"),
                "total": ctx.context.int("achievement_total"),
            })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn achievements_store(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    apply_fields(&mut ctx, &payload);
    match manage_achievements::save_achievement(
        &state.portal,
        &mut ctx,
        &AttachmentField::new("image"),
    ) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "status": "ok", "id": id })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn achievements_update(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    apply_fields(&mut ctx, &payload);
    ctx.post_vars.set("id", id);
    match manage_achievements::save_achievement(
        &state.portal,
        &mut ctx,
        &AttachmentField::new("image"),
    ) {
        Ok(id) => (StatusCode::OK, Json(json!({ "status": "ok", "id": id }))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn achievements_destroy(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    match manage_achievements::destroy_achievement(&state.portal, &mut ctx, id) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn carousel_toggle(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    match manage_carousel::toggle_carousel_slide(&state.portal, &mut ctx, id) {
        Ok(active) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "active": active })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn aspirations_index(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mut ctx = admin_context(&claims);
    if let Some(start) = params.get("start").and_then(|raw| raw.parse::<i64>().ok()) {
        ctx.request.set("start", start);
    }
    match manage_aspirations::list_aspirations(&state.portal, &mut ctx) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "aspirations": ctx.context.get("aspirations"),
                "total": ctx.context.int("aspiration_total"),
                "unread": ctx.context.int("aspiration_unread"),
                "page_links": ctx.context.get("page_links"),
            })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn aspirations_submit(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let mut ctx = PortalContext::default();
    apply_fields(&mut ctx, &payload);
    match manage_aspirations::submit_aspiration(&state.portal, &mut ctx) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "status": "ok", "id": id })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

#[derive(Deserialize)]
struct ChatbotPayload {
    question: String,
}

async fn chatbot_answer(
    State(state): State<AppState>,
    Json(payload): Json<ChatbotPayload>,
) -> impl IntoResponse {
    match chatbot::respond(&state.portal, &payload.question) {
        Ok(reply) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "reply": reply })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn meta_show(
    State(state): State<AppState>,
    Path(page_key): Path<String>,
) -> impl IntoResponse {
    match manage_meta::page_meta(&state.portal, &page_key) {
        Ok(meta) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "meta": meta })),
        )
            .into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
}
