// region:    --- Imports
use super::EntityStore;
use crate::auction::lifecycle::authorize_close;
use crate::auction::model::{Bid, Comment, DeletedRecords, Listing, NewListing, User};
use crate::bidding::commands::evaluate_bid;
use crate::error::{Error, Result};
use crate::money::Money;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;
use tracing::debug;

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    listings: BTreeMap<i64, Listing>,
    bids: BTreeMap<i64, Bid>,
    comments: BTreeMap<i64, Comment>,
    // (user_id, listing_id)
    watchlist: BTreeSet<(i64, i64)>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn listing(&self, listing_id: i64) -> Result<&Listing> {
        self.listings
            .get(&listing_id)
            .ok_or_else(|| Error::NotFound(format!("상품 {listing_id}")))
    }

    fn user(&self, user_id: i64) -> Result<&User> {
        self.users
            .get(&user_id)
            .ok_or_else(|| Error::NotFound(format!("사용자 {user_id}")))
    }
}

/// 프로세스 내 엔티티 저장소
///
/// 모든 테이블을 하나의 뮤텍스로 보호하므로 각 연산이 직렬화된다.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by(|a, b| b.id.cmp(&a.id));
    listings
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(Error::Integrity("이미 사용 중인 아이디입니다.".to_string()));
        }
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn delete_user(&self, user_id: i64) -> Result<DeletedRecords> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(Error::NotFound(format!("사용자 {user_id}")));
        }

        let owned: BTreeSet<i64> = tables
            .listings
            .values()
            .filter(|l| l.created_by == user_id)
            .map(|l| l.id)
            .collect();

        let mut deleted = DeletedRecords::default();

        let before = tables.watchlist.len();
        tables
            .watchlist
            .retain(|(uid, lid)| *uid != user_id && !owned.contains(lid));
        deleted.watchlist_entries = (before - tables.watchlist.len()) as u64;

        let before = tables.comments.len();
        tables
            .comments
            .retain(|_, c| c.author_id != user_id && !owned.contains(&c.listing_id));
        deleted.comments = (before - tables.comments.len()) as u64;

        let before = tables.bids.len();
        tables
            .bids
            .retain(|_, b| b.bidder_id != user_id && !owned.contains(&b.listing_id));
        deleted.bids = (before - tables.bids.len()) as u64;

        tables.listings.retain(|id, _| !owned.contains(id));
        deleted.listings = owned.len() as u64;

        tables.users.remove(&user_id);
        debug!("{:<12} --> 사용자 삭제: {} {:?}", "Store", user_id, deleted);
        Ok(deleted)
    }

    async fn create_listing(&self, creator_id: i64, listing: NewListing) -> Result<Listing> {
        let mut tables = self.tables.lock().await;
        tables.user(creator_id)?;
        let listing = Listing {
            id: tables.next_id(),
            title: listing.title,
            description: listing.description,
            category: listing.category,
            image_url: listing.image_url,
            starting_price: listing.starting_price,
            current_price: listing.starting_price,
            is_open: true,
            created_by: creator_id,
            created_at: Utc::now(),
        };
        tables.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>> {
        Ok(self.tables.lock().await.listings.get(&listing_id).cloned())
    }

    async fn all_listings(&self) -> Result<Vec<Listing>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(tables.listings.values().cloned().collect()))
    }

    async fn listings_in_category(&self, category: &str) -> Result<Vec<Listing>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables
                .listings
                .values()
                .filter(|l| l.category.as_deref() == Some(category))
                .cloned()
                .collect(),
        ))
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let tables = self.tables.lock().await;
        let names: BTreeSet<String> = tables
            .listings
            .values()
            .filter_map(|l| l.category.clone())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn listings_created_by(&self, user_id: i64) -> Result<Vec<Listing>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables
                .listings
                .values()
                .filter(|l| l.created_by == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn place_bid(
        &self,
        listing_id: i64,
        bidder_id: i64,
        amount: Money,
    ) -> Result<(Bid, Listing)> {
        let mut tables = self.tables.lock().await;
        evaluate_bid(tables.listing(listing_id)?, amount)?;
        tables.user(bidder_id)?;

        let bid = Bid {
            id: tables.next_id(),
            listing_id,
            bidder_id,
            amount: amount.amount(),
            created_at: Utc::now(),
        };
        tables.bids.insert(bid.id, bid.clone());

        let listing = tables
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| Error::NotFound(format!("상품 {listing_id}")))?;
        listing.current_price = amount.amount();
        Ok((bid, listing.clone()))
    }

    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bids
            .values()
            .rev()
            .filter(|b| b.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn close_listing(&self, listing_id: i64, requester_id: i64) -> Result<Listing> {
        let mut tables = self.tables.lock().await;
        let listing = tables
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| Error::NotFound(format!("상품 {listing_id}")))?;
        authorize_close(listing, requester_id)?;
        listing.is_open = false;
        Ok(listing.clone())
    }

    async fn add_comment(&self, listing_id: i64, author_id: i64, body: &str) -> Result<Comment> {
        let mut tables = self.tables.lock().await;
        tables.listing(listing_id)?;
        tables.user(author_id)?;
        let comment = Comment {
            id: tables.next_id(),
            listing_id,
            author_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comments_for_listing(&self, listing_id: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.listing(listing_id)?;
        tables.user(user_id)?;
        tables.watchlist.insert((user_id, listing_id));
        Ok(())
    }

    async fn remove_from_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.listing(listing_id)?;
        tables.watchlist.remove(&(user_id, listing_id));
        Ok(())
    }

    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables
                .watchlist
                .iter()
                .filter(|(uid, _)| *uid == user_id)
                .filter_map(|(_, lid)| tables.listings.get(lid).cloned())
                .collect(),
        ))
    }

    async fn watchers_of(&self, listing_id: i64) -> Result<Vec<i64>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .watchlist
            .iter()
            .filter(|(_, lid)| *lid == listing_id)
            .map(|(uid, _)| *uid)
            .collect())
    }

    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .watchlist
            .contains(&(user_id, listing_id)))
    }
}
// endregion: --- Memory Store
