// region:    --- Imports
use super::EntityStore;
use crate::auction::lifecycle::authorize_close;
use crate::auction::model::{Bid, Comment, DeletedRecords, Listing, NewListing, User};
use crate::bidding::commands::evaluate_bid;
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::money::Money;
use crate::query::queries;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Postgres Store
/// PostgreSQL 엔티티 저장소
pub struct PgStore {
    db: Arc<DatabaseManager>,
}

impl PgStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

fn listing_not_found(listing_id: i64) -> Error {
    Error::NotFound(format!("상품 {listing_id}"))
}

/// 상품 행은 먼저 확인하므로 삽입 시 외래 키 위반은 사용자 행이 없다는 뜻
fn user_not_found(user_id: i64) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Error::NotFound(format!("사용자 {user_id}"))
        }
        other => Error::Database(other),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        info!("{:<12} --> 사용자 생성: {}", "Store", username);
        sqlx::query_as::<_, User>(queries::INSERT_USER)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::Integrity("이미 사용 중인 아이디입니다.".to_string())
                }
                other => Error::Database(other),
            })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(queries::GET_USER_BY_USERNAME)
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn delete_user(&self, user_id: i64) -> Result<DeletedRecords> {
        info!("{:<12} --> 사용자 삭제: {}", "Store", user_id);
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, User>(queries::GET_USER)
                        .bind(user_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("사용자 {user_id}")))?;

                    let mut deleted = DeletedRecords::default();
                    deleted.watchlist_entries = sqlx::query(queries::DELETE_WATCHLIST_OF_USER)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    deleted.comments = sqlx::query(queries::DELETE_COMMENTS_OF_USER)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    deleted.bids = sqlx::query(queries::DELETE_BIDS_OF_USER)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    deleted.listings = sqlx::query(queries::DELETE_LISTINGS_OF_USER)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?
                        .rows_affected();
                    sqlx::query(queries::DELETE_USER)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?;

                    debug!("{:<12} --> 삭제된 레코드: {:?}", "Store", deleted);
                    Ok::<_, Error>(deleted)
                })
            })
            .await
    }

    async fn create_listing(&self, creator_id: i64, listing: NewListing) -> Result<Listing> {
        info!("{:<12} --> 상품 등록: {}", "Store", listing.title);
        sqlx::query_as::<_, Listing>(queries::INSERT_LISTING)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.category)
            .bind(&listing.image_url)
            .bind(listing.starting_price)
            .bind(creator_id)
            .fetch_one(self.db.pool())
            .await
            .map_err(user_not_found(creator_id))
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(listing_id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn all_listings(&self) -> Result<Vec<Listing>> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_ALL_LISTINGS)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn listings_in_category(&self, category: &str) -> Result<Vec<Listing>> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTINGS_IN_CATEGORY)
            .bind(category)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar::<_, String>(queries::GET_CATEGORIES)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn listings_created_by(&self, user_id: i64) -> Result<Vec<Listing>> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTINGS_CREATED_BY)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: Money,
    ) -> Result<(Bid, Listing)> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    // 행 잠금으로 동시 입찰을 직렬화
                    let listing = sqlx::query_as::<_, Listing>(queries::GET_LISTING_FOR_UPDATE)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| listing_not_found(listing_id))?;

                    evaluate_bid(&listing, amount)?;

                    let updated = sqlx::query_as::<_, Listing>(queries::UPDATE_CURRENT_PRICE)
                        .bind(amount.amount())
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(Error::BidTooLow {
                            current_price: listing.current_price,
                        })?;

                    let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(listing_id)
                        .bind(bidder_id)
                        .bind(amount.amount())
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(user_not_found(bidder_id))?;

                    Ok::<_, Error>((bid, updated))
                })
            })
            .await
    }

    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>> {
        Ok(sqlx::query_as::<_, Bid>(queries::GET_LISTING_BIDS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn close_listing(&self, listing_id: i64, requester_id: i64) -> Result<Listing> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let listing = sqlx::query_as::<_, Listing>(queries::GET_LISTING_FOR_UPDATE)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| listing_not_found(listing_id))?;

                    authorize_close(&listing, requester_id)?;
                    if !listing.is_open {
                        return Ok(listing);
                    }

                    let closed = sqlx::query_as::<_, Listing>(queries::CLOSE_LISTING)
                        .bind(listing_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok::<_, Error>(closed)
                })
            })
            .await
    }

    async fn add_comment(&self, listing_id: i64, author_id: i64, body: &str) -> Result<Comment> {
        let body = body.to_string();
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| listing_not_found(listing_id))?;

                    let comment = sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
                        .bind(listing_id)
                        .bind(author_id)
                        .bind(&body)
                        .fetch_one(&mut **tx)
                        .await
                        .map_err(user_not_found(author_id))?;
                    Ok::<_, Error>(comment)
                })
            })
            .await
    }

    async fn comments_for_listing(&self, listing_id: i64) -> Result<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(queries::GET_LISTING_COMMENTS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| listing_not_found(listing_id))?;

                    sqlx::query(queries::INSERT_WATCHLIST)
                        .bind(user_id)
                        .bind(listing_id)
                        .execute(&mut **tx)
                        .await
                        .map_err(user_not_found(user_id))?;
                    Ok::<_, Error>(())
                })
            })
            .await
    }

    async fn remove_from_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()> {
        self.get_listing(listing_id)
            .await?
            .ok_or_else(|| listing_not_found(listing_id))?;
        sqlx::query(queries::DELETE_WATCHLIST)
            .bind(user_id)
            .bind(listing_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>> {
        Ok(sqlx::query_as::<_, Listing>(queries::GET_WATCHED_LISTINGS)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn watchers_of(&self, listing_id: i64) -> Result<Vec<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(queries::GET_WATCHERS)
            .bind(listing_id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
            .bind(user_id)
            .bind(listing_id)
            .fetch_one(self.db.pool())
            .await?)
    }
}
// endregion: --- Postgres Store
