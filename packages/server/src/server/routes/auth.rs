use axum::{extract::Extension, http::StatusCode, Json};

use crate::common::Result;
use crate::domains::auth::actions::{login, register};
use crate::domains::auth::{AuthPayload, LoginInput, RegisterInput};
use crate::domains::users::UserData;
use crate::server::app::AppState;
use crate::server::extract::ValidatedJson;
use crate::server::middleware::CurrentUser;

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthPayload>)> {
    let payload = register(&state.deps, input).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> Result<Json<AuthPayload>> {
    Ok(Json(login(&state.deps, input).await?))
}

/// The caller's profile with its derived role group
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<UserData> {
    Json(UserData::from(&user))
}
