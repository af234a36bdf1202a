/// 관심 목록 관리
/// 추가/삭제는 멱등이며 상품 가격이나 경매 상태를 바꾸지 않는다.
// region:    --- Imports
use crate::auction::model::Listing;
use crate::error::Result;
use crate::store::EntityStore;
use tracing::info;

// endregion: --- Imports

// region:    --- Watchlist

/// 관심 목록 추가
pub async fn add_to_watchlist(store: &dyn EntityStore, user_id: i64, listing_id: i64) -> Result<()> {
    info!(
        "{:<12} --> 관심 목록 추가: user={}, listing={}",
        "Watchlist", user_id, listing_id
    );
    store.add_to_watchlist(user_id, listing_id).await
}

/// 관심 목록 삭제
pub async fn remove_from_watchlist(
    store: &dyn EntityStore,
    user_id: i64,
    listing_id: i64,
) -> Result<()> {
    info!(
        "{:<12} --> 관심 목록 삭제: user={}, listing={}",
        "Watchlist", user_id, listing_id
    );
    store.remove_from_watchlist(user_id, listing_id).await
}

/// 사용자 관심 상품 조회
pub async fn list_watched(store: &dyn EntityStore, user_id: i64) -> Result<Vec<Listing>> {
    info!("{:<12} --> 관심 목록 조회: user={}", "Watchlist", user_id);
    store.watched_listings(user_id).await
}

// endregion: --- Watchlist

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::NewListing;
    use crate::money::Money;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn watching_does_not_touch_listing_state() {
        let store = MemoryStore::new();
        let seller = store.create_user("seller", "", "x").await.unwrap();
        let watcher = store.create_user("watcher", "", "x").await.unwrap();
        let listing = store
            .create_listing(
                seller.id,
                NewListing {
                    title: "Chair".to_string(),
                    description: String::new(),
                    category: None,
                    image_url: None,
                    starting_price: Decimal::new(500, 2),
                },
            )
            .await
            .unwrap();

        add_to_watchlist(&store, watcher.id, listing.id).await.unwrap();
        add_to_watchlist(&store, watcher.id, listing.id).await.unwrap();

        let watched = list_watched(&store, watcher.id).await.unwrap();
        assert_eq!(watched, vec![listing.clone()]);
        assert_eq!(store.get_listing(listing.id).await.unwrap(), Some(listing.clone()));

        store
            .place_bid(listing.id, watcher.id, Money::parse("6").unwrap())
            .await
            .unwrap();
        remove_from_watchlist(&store, watcher.id, listing.id).await.unwrap();
        assert!(list_watched(&store, watcher.id).await.unwrap().is_empty());
        assert!(!store.is_watching(watcher.id, listing.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_listing_is_rejected() {
        let store = MemoryStore::new();
        let user = store.create_user("u", "", "x").await.unwrap();
        assert!(add_to_watchlist(&store, user.id, 404).await.is_err());
    }
}
