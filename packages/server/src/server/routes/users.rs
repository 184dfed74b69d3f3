use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::{Error, Result, UserId};
use crate::domains::users::actions::{get_user, update_user};
use crate::domains::users::data::UpdateUserInput;
use crate::domains::users::UserData;
use crate::server::app::AppState;
use crate::server::extract::ValidatedJson;
use crate::server::middleware::CurrentUser;

fn parse_user_id(raw: &str) -> Result<UserId> {
    UserId::parse(raw).map_err(|_| Error::NotFound("user"))
}

pub async fn get_user_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<UserData>> {
    let user = get_user(&state.deps, &actor, parse_user_id(&id)?).await?;
    Ok(Json(UserData::from(&user)))
}

pub async fn update_user_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUserInput>,
) -> Result<Json<UserData>> {
    let user = update_user(&state.deps, &actor, parse_user_id(&id)?, input).await?;
    Ok(Json(UserData::from(&user)))
}
