use chrono::Utc;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_db_pools::sqlx::{self, Row};
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;

use crate::auth::guards::AuthUser;
use crate::auth::responses::{LoginRequest, LoginResponse, UserSummary};
use crate::auth::{AuthError, AuthState};

type AuthRouteResult<T> = Result<Json<T>, status::Custom<Json<AuthErrorResponse>>>;

#[derive(Debug, serde::Serialize, JsonSchema)]
pub struct AuthErrorResponse {
    pub status: u16,
    pub message: String,
}

/// Exchange email and password for a bearer access token.
#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<payload>")]
pub async fn login(
    state: &State<AuthState>,
    pool: &State<sqlx::PgPool>,
    payload: Json<LoginRequest>,
) -> AuthRouteResult<LoginResponse> {
    let email = payload.email.trim().to_lowercase();
    let password = payload.password.trim();

    if email.is_empty() || password.is_empty() {
        return Err(respond_message(
            Status::BadRequest,
            "Email and password are required",
        ));
    }

    let row = sqlx::query(
        r#"
        SELECT id, email, display_name, password_hash, disabled
        FROM users
        WHERE lower(email) = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(pool.inner())
    .await
    .map_err(|err| respond_error(AuthError::from(err)))?;

    let row = match row {
        Some(row) => row,
        None => return Err(respond_error(AuthError::InvalidCredentials)),
    };

    let user_id: i32 = row
        .try_get("id")
        .map_err(|err| respond_error(AuthError::from(err)))?;
    let db_email: String = row
        .try_get("email")
        .map_err(|err| respond_error(AuthError::from(err)))?;
    let display_name: Option<String> = row
        .try_get("display_name")
        .map_err(|err| respond_error(AuthError::from(err)))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|err| respond_error(AuthError::from(err)))?;
    let disabled: bool = row
        .try_get("disabled")
        .map_err(|err| respond_error(AuthError::from(err)))?;

    let verified = state
        .password_service
        .verify_password(password, &password_hash)
        .map_err(respond_error)?;

    if !verified {
        log::info!("failed login for {}", email);
        return Err(respond_error(AuthError::InvalidCredentials));
    }

    if disabled {
        return Err(respond_error(AuthError::AccountDisabled));
    }

    let upgraded_hash = if state
        .password_service
        .needs_rehash(&password_hash)
        .map_err(respond_error)?
    {
        log::info!("upgrading password hash for user {}", user_id);
        Some(
            state
                .password_service
                .hash_password(password)
                .map_err(respond_error)?,
        )
    } else {
        None
    };

    sqlx::query(
        r#"
        UPDATE users
        SET last_login_at = $1, password_hash = COALESCE($2, password_hash)
        WHERE id = $3
        "#,
    )
    .bind(Utc::now())
    .bind(upgraded_hash)
    .bind(user_id)
    .execute(pool.inner())
    .await
    .map_err(|err| respond_error(AuthError::from(err)))?;

    let access_token = state
        .jwt_service
        .issue_access_token(user_id, &db_email)
        .map_err(respond_error)?;

    Ok(Json(LoginResponse {
        access_token: access_token.token,
        access_token_expires_at: access_token.expires_at,
        user: UserSummary {
            id: user_id,
            email: db_email,
            display_name,
        },
    }))
}

/// The account behind the presented access token.
#[openapi(tag = "Auth")]
#[get("/auth/me")]
pub async fn me(
    pool: &State<sqlx::PgPool>,
    user: AuthUser,
) -> AuthRouteResult<UserSummary> {
    let display_name: Option<String> =
        sqlx::query_scalar("SELECT display_name FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(pool.inner())
            .await
            .map_err(|err| respond_error(AuthError::from(err)))?;

    Ok(Json(UserSummary {
        id: user.id,
        email: user.email,
        display_name,
    }))
}

fn respond_error(err: AuthError) -> status::Custom<Json<AuthErrorResponse>> {
    let status = err.status();
    if status.code >= 500 {
        log::error!("auth failure: {}", err);
    }
    status::Custom(
        status,
        Json(AuthErrorResponse {
            status: status.code,
            message: err.to_string(),
        }),
    )
}

fn respond_message(
    status: Status,
    message: impl Into<String>,
) -> status::Custom<Json<AuthErrorResponse>> {
    status::Custom(
        status,
        Json(AuthErrorResponse {
            status: status.code,
            message: message.into(),
        }),
    )
}
