/// 상품 등록, 상세 조회, 카테고리, 댓글
// region:    --- Imports
use crate::auction::lifecycle::winner_of;
use crate::auction::model::{Bid, Comment, Listing, NewListing};
use crate::error::{Error, Result};
use crate::money::Money;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Forms

/// 상품 등록 폼
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewListingForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 시작가
    pub bid: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewListingForm {
    /// 폼 검증
    pub fn validate(self) -> Result<NewListing> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("제목을 입력해 주세요.".to_string()));
        }
        let starting_price = Money::parse(&self.bid)?;
        Ok(NewListing {
            title,
            description: self.description.trim().to_string(),
            category: non_blank(self.category),
            image_url: non_blank(self.image_url),
            starting_price: starting_price.amount(),
        })
    }
}

// endregion: --- Forms

// region:    --- View Models

/// 상품 상세 화면
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub bid_count: usize,
    pub bids: Vec<Bid>,
    pub comments: Vec<Comment>,
    pub user_is_watching: bool,
    pub user_is_creator: bool,
    pub winner_id: Option<i64>,
    pub user_is_winner: bool,
}

// endregion: --- View Models

// region:    --- Operations

/// 상품 등록
pub async fn create_listing(
    store: &dyn EntityStore,
    creator_id: i64,
    form: NewListingForm,
) -> Result<Listing> {
    let new_listing = form.validate()?;
    info!(
        "{:<12} --> 상품 등록: creator={}, title={}",
        "Listing", creator_id, new_listing.title
    );
    store.create_listing(creator_id, new_listing).await
}

/// 상품 상세 조회. 로그인 사용자가 있으면 사용자별 정보를 채운다.
pub async fn listing_detail(
    store: &dyn EntityStore,
    listing_id: i64,
    viewer_id: Option<i64>,
) -> Result<ListingDetail> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "Listing", listing_id);
    let listing = store
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("상품 {listing_id}")))?;

    let bids = store.bids_for_listing(listing_id).await?;
    let comments = store.comments_for_listing(listing_id).await?;
    let winner_id = winner_of(store, &listing).await?;

    let user_is_watching = match viewer_id {
        Some(user_id) => store.is_watching(user_id, listing_id).await?,
        None => false,
    };

    Ok(ListingDetail {
        bid_count: bids.len(),
        user_is_creator: viewer_id == Some(listing.created_by),
        user_is_winner: viewer_id.is_some() && viewer_id == winner_id,
        listing,
        bids,
        comments,
        user_is_watching,
        winner_id,
    })
}

/// 댓글 작성
pub async fn post_comment(
    store: &dyn EntityStore,
    author_id: i64,
    listing_id: i64,
    body: &str,
) -> Result<Comment> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::Validation("댓글 내용을 입력해 주세요.".to_string()));
    }
    info!(
        "{:<12} --> 댓글 작성: listing={}, author={}",
        "Listing", listing_id, author_id
    );
    store.add_comment(listing_id, author_id, body).await
}

/// 카테고리 목록
pub async fn categories(store: &dyn EntityStore) -> Result<Vec<String>> {
    store.categories().await
}

/// 카테고리별 상품
pub async fn listings_in_category(store: &dyn EntityStore, name: &str) -> Result<Vec<Listing>> {
    info!("{:<12} --> 카테고리 상품 조회: {}", "Listing", name);
    store.listings_in_category(name.trim()).await
}

// endregion: --- Operations
