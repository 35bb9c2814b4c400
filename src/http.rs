//! HTTP boundary over [`Accounts`], enabled with the `http` feature
//!
//! Writes require the caller identity in the `x-actor-id` header; the
//! surrounding auth layer is expected to set it.

use axum::{
    async_trait,
    extract::{FromRequestParts, Json, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::accounts::Accounts;
use crate::traits::AccountsStorage;
use crate::types::*;

/// Header carrying the authenticated caller
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: Option<ErrorKind>,
    pub message: String,
}

/// Errors returned by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("missing x-actor-id header")]
    MissingActor,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match self {
            ApiError::Engine(ref err) => (
                StatusCode::from_u16(err.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Some(err.kind()),
            ),
            ApiError::MissingActor => (StatusCode::UNAUTHORIZED, None),
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Caller identity taken from [`ACTOR_HEADER`]
pub struct RequireActor(pub Actor);

#[async_trait]
impl<St: Send + Sync> FromRequestParts<St> for RequireActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| RequireActor(Actor::new(v)))
            .ok_or(ApiError::MissingActor)
    }
}

/// Optional ledger period
#[derive(Debug, Default, Deserialize)]
pub struct LedgerPeriod {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Body of a reversal request
#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub narration: Option<String>,
}

type AppState<S> = State<Arc<Accounts<S>>>;
type ApiResult<T> = Result<T, ApiError>;

/// Build the `/accounts` router
pub fn router<S: AccountsStorage + 'static>(accounts: Arc<Accounts<S>>) -> Router {
    Router::new()
        .route(
            "/accounts/vouchers",
            get(list_vouchers::<S>).post(post_voucher::<S>),
        )
        .route("/accounts/vouchers/:id", get(get_voucher::<S>))
        .route("/accounts/vouchers/:id/reverse", post(reverse_voucher::<S>))
        .route("/accounts/ledger/:party_id", get(get_ledger::<S>))
        .route("/accounts/items", get(get_inventory::<S>))
        .route("/accounts/items/:id", get(get_item_stock::<S>))
        .route(
            "/accounts/item-master",
            get(list_items::<S>).post(create_item::<S>),
        )
        .route(
            "/accounts/groups",
            get(list_groups::<S>).post(create_group::<S>),
        )
        .route(
            "/accounts/parties",
            get(list_parties::<S>).post(create_party::<S>),
        )
        .route("/accounts/outstanding", get(get_outstanding::<S>))
        .with_state(accounts)
}

async fn post_voucher<S: AccountsStorage>(
    State(accounts): AppState<S>,
    RequireActor(actor): RequireActor,
    Json(input): Json<VoucherInput>,
) -> ApiResult<(StatusCode, Json<Voucher>)> {
    let voucher = accounts.post_voucher(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

async fn list_vouchers<S: AccountsStorage>(
    State(accounts): AppState<S>,
    Query(filter): Query<VoucherFilter>,
) -> ApiResult<Json<Vec<Voucher>>> {
    Ok(Json(accounts.list_vouchers(&filter).await?))
}

async fn get_voucher<S: AccountsStorage>(
    State(accounts): AppState<S>,
    Path(id): Path<String>,
) -> ApiResult<Json<Voucher>> {
    let voucher = accounts
        .get_voucher(&id)
        .await?
        .ok_or_else(|| EngineError::not_found(EntityKind::Voucher, id))?;
    Ok(Json(voucher))
}

async fn reverse_voucher<S: AccountsStorage>(
    State(accounts): AppState<S>,
    Path(id): Path<String>,
    RequireActor(actor): RequireActor,
    Json(body): Json<ReverseRequest>,
) -> ApiResult<(StatusCode, Json<Voucher>)> {
    let voucher = accounts
        .reverse_voucher(&id, body.date, body.narration, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

async fn get_ledger<S: AccountsStorage>(
    State(accounts): AppState<S>,
    Path(party_id): Path<String>,
    Query(period): Query<LedgerPeriod>,
) -> ApiResult<Json<crate::projection::PartyLedger>> {
    let ledger = accounts
        .get_ledger_between(&party_id, period.from, period.to)
        .await?;
    Ok(Json(ledger))
}

async fn get_inventory<S: AccountsStorage>(
    State(accounts): AppState<S>,
) -> ApiResult<Json<Vec<crate::projection::StockPosition>>> {
    Ok(Json(accounts.get_inventory().await?))
}

async fn get_item_stock<S: AccountsStorage>(
    State(accounts): AppState<S>,
    Path(id): Path<String>,
) -> ApiResult<Json<crate::projection::StockPosition>> {
    Ok(Json(accounts.get_item_stock(&id).await?))
}

async fn list_items<S: AccountsStorage>(State(accounts): AppState<S>) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(accounts.list_items().await?))
}

async fn create_item<S: AccountsStorage>(
    State(accounts): AppState<S>,
    RequireActor(actor): RequireActor,
    Json(input): Json<ItemInput>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = accounts.create_item(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_groups<S: AccountsStorage>(
    State(accounts): AppState<S>,
) -> ApiResult<Json<Vec<AccountGroup>>> {
    Ok(Json(accounts.list_groups().await?))
}

async fn create_group<S: AccountsStorage>(
    State(accounts): AppState<S>,
    RequireActor(actor): RequireActor,
    Json(input): Json<GroupInput>,
) -> ApiResult<(StatusCode, Json<AccountGroup>)> {
    let group = accounts.create_group(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn list_parties<S: AccountsStorage>(
    State(accounts): AppState<S>,
) -> ApiResult<Json<Vec<Party>>> {
    Ok(Json(accounts.list_parties().await?))
}

async fn create_party<S: AccountsStorage>(
    State(accounts): AppState<S>,
    RequireActor(actor): RequireActor,
    Json(input): Json<PartyInput>,
) -> ApiResult<(StatusCode, Json<Party>)> {
    let party = accounts.create_party(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

async fn get_outstanding<S: AccountsStorage>(
    State(accounts): AppState<S>,
) -> ApiResult<Json<Vec<crate::projection::GroupOutstanding>>> {
    Ok(Json(accounts.get_outstanding().await?))
}
