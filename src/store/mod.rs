// region:    --- Imports
use crate::auction::model::{Bid, Comment, DeletedRecords, Listing, NewListing, User};
use crate::error::Result;
use crate::money::Money;
use async_trait::async_trait;

// endregion: --- Imports

// region:    --- Modules
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;
// endregion: --- Modules

// region:    --- Entity Store Trait
/// 엔티티 저장소 트레이트
///
/// `place_bid`와 `close_listing`은 조회와 기록을 하나의 원자적 단위로
/// 처리해야 한다. 동시에 들어온 두 입찰이 같은 현재 가격을 기준으로
/// 모두 성공해서는 안 된다.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // 사용자
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// 사용자와 사용자 소유 레코드(상품, 입찰, 댓글, 관심 목록)를 명시적으로 삭제
    async fn delete_user(&self, user_id: i64) -> Result<DeletedRecords>;

    // 상품
    async fn create_listing(&self, creator_id: i64, listing: NewListing) -> Result<Listing>;
    async fn get_listing(&self, listing_id: i64) -> Result<Option<Listing>>;
    async fn all_listings(&self) -> Result<Vec<Listing>>;
    async fn listings_in_category(&self, category: &str) -> Result<Vec<Listing>>;
    async fn categories(&self) -> Result<Vec<String>>;
    async fn listings_created_by(&self, user_id: i64) -> Result<Vec<Listing>>;

    // 입찰 / 경매 종료
    async fn place_bid(&self, listing_id: i64, bidder_id: i64, amount: Money)
        -> Result<(Bid, Listing)>;
    async fn bids_for_listing(&self, listing_id: i64) -> Result<Vec<Bid>>;
    async fn close_listing(&self, listing_id: i64, requester_id: i64) -> Result<Listing>;

    // 댓글
    async fn add_comment(&self, listing_id: i64, author_id: i64, body: &str) -> Result<Comment>;
    async fn comments_for_listing(&self, listing_id: i64) -> Result<Vec<Comment>>;

    // 관심 목록
    async fn add_to_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()>;
    async fn remove_from_watchlist(&self, user_id: i64, listing_id: i64) -> Result<()>;
    async fn watched_listings(&self, user_id: i64) -> Result<Vec<Listing>>;
    async fn watchers_of(&self, listing_id: i64) -> Result<Vec<i64>>;
    async fn is_watching(&self, user_id: i64, listing_id: i64) -> Result<bool>;
}
// endregion: --- Entity Store Trait
