// region:    --- Imports
use crate::auction::lifecycle::{handle_close_listing, ClosedListing, CloseListingCommand};
use crate::bidding::commands::{handle_place_bid, BidPlaced, PlaceBidCommand};
use crate::config::MAX_BODY_BYTES;
use crate::error::{Error, Result};
use crate::listing::{self, ListingDetail, NewListingForm};
use crate::money::Money;
use crate::session::{
    self, expired_session_cookie, session_cookie, session_token, CurrentUser, LoginForm, MaybeUser,
    RegisterForm, SessionStore,
};
use crate::store::EntityStore;
use crate::watchlist;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- State

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

// endregion: --- State

// region:    --- Forms

/// 추출 실패도 `Error` JSON 응답으로 변환
type FormBody<T> = WithRejection<Form<T>, Error>;
type ListingId = WithRejection<Path<i64>, Error>;

/// 입찰 폼
#[derive(Debug, Deserialize)]
pub struct PlaceBidForm {
    #[serde(rename = "placeBid")]
    pub place_bid: String,
}

/// 댓글 폼
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub comment: String,
}

// endregion: --- Forms

// region:    --- Session Handlers

/// 로그인 화면
pub async fn handle_login_page(MaybeUser(user): MaybeUser) -> Json<Value> {
    Json(json!({ "page": "login", "user": user }))
}

/// 로그인
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): FormBody<LoginForm>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 로그인 요청: {}", "Handler", form.username);
    let (user, token) = session::login(state.store.as_ref(), &state.sessions, form).await?;
    Ok((
        jar.add(session_cookie(token)),
        Json(json!({ "message": "로그인되었습니다.", "user": user })),
    ))
}

/// 로그아웃
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        state.sessions.close(&token).await;
    }
    info!("{:<12} --> 로그아웃", "Handler");
    (
        jar.add(expired_session_cookie()),
        Json(json!({ "message": "로그아웃되었습니다." })),
    )
}

/// 회원가입 화면
pub async fn handle_register_page() -> Json<Value> {
    Json(json!({ "page": "register" }))
}

/// 회원가입
pub async fn handle_register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): FormBody<RegisterForm>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 회원가입 요청: {}", "Handler", form.username);
    let (user, token) = session::register(state.store.as_ref(), &state.sessions, form).await?;
    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(json!({ "message": "회원가입이 완료되었습니다.", "user": user })),
    ))
}

/// 계정 삭제
pub async fn handle_delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 계정 삭제 요청: {}", "Handler", user.id);
    let deleted = session::delete_account(state.store.as_ref(), &state.sessions, user.id).await?;
    Ok((
        jar.add(expired_session_cookie()),
        Json(json!({ "message": "계정이 삭제되었습니다.", "deleted": deleted })),
    ))
}

// endregion: --- Session Handlers

// region:    --- Command Handlers

/// 상품 등록 화면
pub async fn handle_new_listing_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    let categories = listing::categories(state.store.as_ref()).await?;
    Ok(Json(json!({
        "page": "new_listing",
        "user": user,
        "categories": categories,
    })))
}

/// 상품 등록
pub async fn handle_new_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Form(form), _): FormBody<NewListingForm>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 상품 등록 요청: {:?}", "Handler", form);
    let created = listing::create_listing(state.store.as_ref(), user.id, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
    WithRejection(Form(form), _): FormBody<PlaceBidForm>,
) -> Result<Json<BidPlaced>> {
    info!(
        "{:<12} --> 입찰 요청: listing={}, amount={}",
        "Handler", listing_id, form.place_bid
    );
    let cmd = PlaceBidCommand {
        listing_id,
        bidder_id: user.id,
        amount: Money::parse(&form.place_bid)?,
    };
    let placed = handle_place_bid(state.store.as_ref(), cmd).await?;
    Ok(Json(placed))
}

/// 경매 종료
pub async fn handle_close(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> Result<Json<ClosedListing>> {
    info!("{:<12} --> 경매 종료 요청: listing={}", "Handler", listing_id);
    let cmd = CloseListingCommand {
        listing_id,
        requester_id: user.id,
    };
    Ok(Json(handle_close_listing(state.store.as_ref(), cmd).await?))
}

/// 댓글 작성
pub async fn handle_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
    WithRejection(Form(form), _): FormBody<CommentForm>,
) -> Result<impl IntoResponse> {
    let comment =
        listing::post_comment(state.store.as_ref(), user.id, listing_id, &form.comment).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// 관심 목록 추가
pub async fn handle_add_to_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> Result<Json<Value>> {
    watchlist::add_to_watchlist(state.store.as_ref(), user.id, listing_id).await?;
    Ok(Json(json!({ "listing_id": listing_id, "user_is_watching": true })))
}

/// 관심 목록 삭제
pub async fn handle_remove_from_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> Result<Json<Value>> {
    watchlist::remove_from_watchlist(state.store.as_ref(), user.id, listing_id).await?;
    Ok(Json(json!({ "listing_id": listing_id, "user_is_watching": false })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 상품 조회
pub async fn handle_index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<Value>> {
    info!("{:<12} --> 모든 상품 조회", "HandlerQuery");
    let listings = state.store.all_listings().await?;
    Ok(Json(json!({ "user": user, "all_listings": listings })))
}

/// 상품 상세 조회
pub async fn handle_listing(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> Result<Json<ListingDetail>> {
    let viewer_id = user.map(|u| u.id);
    Ok(Json(
        listing::listing_detail(state.store.as_ref(), listing_id, viewer_id).await?,
    ))
}

/// 관심 목록 조회
pub async fn handle_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    let listings = watchlist::list_watched(state.store.as_ref(), user.id).await?;
    Ok(Json(json!({ "watchList": listings })))
}

/// 카테고리 목록 조회
pub async fn handle_categories(State(state): State<AppState>) -> Result<Json<Value>> {
    info!("{:<12} --> 카테고리 목록 조회", "HandlerQuery");
    let categories = listing::categories(state.store.as_ref()).await?;
    Ok(Json(json!({ "categories": categories })))
}

/// 카테고리별 상품 조회
pub async fn handle_category(
    State(state): State<AppState>,
    WithRejection(Path(name), _): WithRejection<Path<String>, Error>,
) -> Result<Json<Value>> {
    let listings = listing::listings_in_category(state.store.as_ref(), &name).await?;
    Ok(Json(json!({ "category": name, "listings": listings })))
}

// endregion: --- Query Handlers

// region:    --- Router

/// 라우터 설정
pub fn routes(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/login", get(handle_login_page).post(handle_login))
        .route("/logout", get(handle_logout).post(handle_logout))
        .route("/register", get(handle_register_page).post(handle_register))
        .route(
            "/new_listing",
            get(handle_new_listing_page).post(handle_new_listing),
        )
        .route("/listing/:id", get(handle_listing))
        .route("/bid/:id", post(handle_bid))
        .route("/close/:id", post(handle_close))
        .route("/comment/:id", post(handle_comment))
        .route("/add_to_watchlist/:id", post(handle_add_to_watchlist))
        .route(
            "/remove_from_watchlist/:id",
            post(handle_remove_from_watchlist),
        )
        .route("/watchList", get(handle_watchlist))
        .route("/categories", get(handle_categories))
        .route("/category/:name", get(handle_category))
        .route("/delete_account", post(handle_delete_account))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// endregion: --- Router
