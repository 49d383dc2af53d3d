//! Storefront users and back-office admins: identical routes over two tables.

use axum::{
    Extension, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{release_owned, write_with_assets};
use crate::assets::AssetBacked;
use crate::auth::{hash_password, verify_password};
use crate::db::patch::{AccountPatch, NewAccount};
use crate::db::{AccountKind, DbAccount};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, FormData, PageQuery};
use crate::server::router::EmporiumState;

const BAD_CREDENTIALS: &str = "Invalid Password Credentials";

#[derive(Clone, Copy)]
struct Labels {
    item: &'static str,
    list: &'static str,
    count: &'static str,
    exists: &'static str,
    unknown: &'static str,
}

fn labels(kind: AccountKind) -> Labels {
    match kind {
        AccountKind::User => Labels {
            item: "user",
            list: "userList",
            count: "userCount",
            exists: "User already exists..Check email or phone",
            unknown: "User doesnt exist",
        },
        AccountKind::Admin => Labels {
            item: "admin",
            list: "adminList",
            count: "adminCount",
            exists: "Admin already exists..Check email or phone",
            unknown: "Admin doesnt exist",
        },
    }
}

#[derive(Debug, Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SigninBody {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct GoogleBody {
    #[serde(default)]
    name: String,
    email: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    image: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn router(kind: AccountKind) -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/authWithGoogle", post(auth_with_google))
        .route("/get/count", get(count))
        .route("/{id}", get(get_one).patch(update).delete(remove))
        .layer(Extension(kind))
}

fn signed_in(
    state: &EmporiumState,
    kind: AccountKind,
    account: DbAccount,
) -> Result<ApiResponse, EmporiumError> {
    let token = state.tokens.issue(account.id, &account.email)?;
    ApiResponse::ok()
        .with(labels(kind).item, account)?
        .with("token", token)
}

async fn signup(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiJson(body): ApiJson<SignupBody>,
) -> Result<ApiResponse, EmporiumError> {
    let email = body.email.trim().to_string();
    if email.is_empty() || body.password.is_empty() {
        return Err(EmporiumError::validation("email and password are required"));
    }
    let phone = non_blank(body.phone);

    let repo = state.repos.accounts(kind);
    if repo.is_taken(&email, phone.as_deref()).await? {
        return Err(EmporiumError::conflict(labels(kind).exists));
    }

    let account = repo
        .create(NewAccount {
            name: body.name,
            email,
            phone,
            password_hash: Some(hash_password(&body.password)?),
            image: String::new(),
        })
        .await?;

    info!(kind = ?kind, id = account.id, "account created");
    signed_in(&state, kind, account)
}

async fn signin(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiJson(body): ApiJson<SigninBody>,
) -> Result<ApiResponse, EmporiumError> {
    let account = state
        .repos
        .accounts(kind)
        .find_by_email(body.email.trim())
        .await?
        .ok_or_else(|| EmporiumError::validation(labels(kind).unknown))?;

    let Some(hash) = account.password.as_deref() else {
        return Err(EmporiumError::validation(BAD_CREDENTIALS));
    };
    if !verify_password(&body.password, hash)? {
        warn!(kind = ?kind, id = account.id, "signin with a wrong password");
        return Err(EmporiumError::validation(BAD_CREDENTIALS));
    }

    Ok(signed_in(&state, kind, account)?.message("Succesfully Authenticated"))
}

async fn auth_with_google(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiJson(body): ApiJson<GoogleBody>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = state.repos.accounts(kind);
    let email = body.email.trim().to_string();
    if email.is_empty() {
        return Err(EmporiumError::validation("email is required"));
    }

    if let Some(existing) = repo.find_by_email(&email).await? {
        return signed_in(&state, kind, existing);
    }

    let password_hash = non_blank(body.password)
        .map(|p| hash_password(&p))
        .transpose()?;
    // The provider's picture URL is stored without an asset id, so it is never released.
    let account = repo
        .create(NewAccount {
            name: body.name,
            email,
            phone: non_blank(body.phone),
            password_hash,
            image: body.image,
        })
        .await?;

    info!(kind = ?kind, id = account.id, "account created through google sign-in");
    signed_in(&state, kind, account)
}

async fn list(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiQuery(paging): ApiQuery<PageQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state
        .repos
        .accounts(kind)
        .list(state.page(&paging))
        .await?;
    ApiResponse::page(labels(kind).list, page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let account = state
        .repos
        .accounts(kind)
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.unknown))?;
    ApiResponse::ok().with(labels.item, account)
}

async fn count(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
) -> Result<ApiResponse, EmporiumError> {
    let total = state.repos.accounts(kind).count().await?;
    ApiResponse::ok().with(labels(kind).count, total)
}

async fn update(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiPath(id): ApiPath<i64>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.accounts(kind);
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.unknown))?;

    let password_hash = match (form.text("oldpassword"), form.text("password")) {
        (Some(old), Some(new)) => {
            let matches = match existing.password.as_deref() {
                Some(hash) => verify_password(&old, hash)?,
                None => false,
            };
            if !matches {
                return Err(EmporiumError::validation(BAD_CREDENTIALS));
            }
            Some(hash_password(&new)?)
        }
        _ => None,
    };

    let patch = AccountPatch {
        name: form.text("name"),
        email: form.text("email"),
        phone: form.text("phone"),
        password_hash,
        avatar: None,
    };

    // One file replaces the avatar; no file keeps it.
    let avatar = form.files().first().cloned();
    let desired = avatar.as_ref().map(|_| Vec::new());
    let payloads: Vec<_> = avatar.into_iter().collect();

    let account = write_with_assets(
        &state,
        &existing.assets(),
        desired,
        &payloads,
        0,
        |assets| async move {
            let avatar = assets.and_then(|a| a.into_iter().next());
            let patch = AccountPatch { avatar, ..patch };
            repo.update(id, &patch)
                .await?
                .ok_or_else(|| EmporiumError::not_found(labels.unknown))
        },
    )
    .await?;

    ApiResponse::ok().with(labels.item, account)
}

async fn remove(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<AccountKind>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.accounts(kind);
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.unknown))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;

    info!(kind = ?kind, id, "account deleted");
    Ok(ApiResponse::ok().message("Account successfully deleted"))
}
