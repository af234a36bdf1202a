//! DATABASE_URL이 설정된 경우에만 PostgreSQL 저장소를 검증한다.
use auction_marketplace::auction::lifecycle::{handle_close_listing, CloseListingCommand};
use auction_marketplace::auction::model::{NewListing, User};
use auction_marketplace::bidding::commands::{handle_place_bid, PlaceBidCommand};
use auction_marketplace::database::DatabaseManager;
use auction_marketplace::error::Error;
use auction_marketplace::money::Money;
use auction_marketplace::store::{EntityStore, PgStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// 데이터베이스 저장소 설정
async fn setup() -> Option<Arc<PgStore>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db_manager = DatabaseManager::connect(&url, 5).await.unwrap();
    db_manager.initialize_database().await.unwrap();
    Some(Arc::new(PgStore::new(Arc::new(db_manager))))
}

async fn create_user(store: &PgStore, prefix: &str) -> User {
    let username = format!("{prefix}-{}", Uuid::new_v4().simple());
    store.create_user(&username, "", "x").await.unwrap()
}

fn new_listing(price: Decimal) -> NewListing {
    NewListing {
        title: "테스트 상품".to_string(),
        description: "PostgreSQL 저장소 테스트".to_string(),
        category: Some("Test".to_string()),
        image_url: None,
        starting_price: price,
    }
}

fn money(raw: &str) -> Money {
    Money::parse(raw).unwrap()
}

/// 입찰 및 종료 시나리오
#[tokio::test]
async fn test_pg_bid_scenario() {
    let Some(store) = setup().await else {
        return;
    };
    let seller = create_user(&store, "seller").await;
    let buyer = create_user(&store, "buyer").await;
    let listing = store
        .create_listing(seller.id, new_listing(Decimal::new(1000, 2)))
        .await
        .unwrap();

    let bid = |amount: &str| PlaceBidCommand {
        listing_id: listing.id,
        bidder_id: buyer.id,
        amount: money(amount),
    };

    assert!(matches!(
        handle_place_bid(store.as_ref(), bid("9.99")).await,
        Err(Error::BidTooLow { .. })
    ));
    let placed = handle_place_bid(store.as_ref(), bid("10.01")).await.unwrap();
    assert_eq!(placed.listing.current_price, Decimal::new(1001, 2));
    assert!(matches!(
        handle_place_bid(store.as_ref(), bid("10.01")).await,
        Err(Error::BidTooLow { .. })
    ));

    let err = handle_close_listing(
        store.as_ref(),
        CloseListingCommand {
            listing_id: listing.id,
            requester_id: buyer.id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));

    let closed = handle_close_listing(
        store.as_ref(),
        CloseListingCommand {
            listing_id: listing.id,
            requester_id: seller.id,
        },
    )
    .await
    .unwrap();
    assert!(!closed.listing.is_open);
    assert_eq!(closed.winner_id, Some(buyer.id));

    assert!(matches!(
        handle_place_bid(store.as_ref(), bid("99")).await,
        Err(Error::ListingClosed)
    ));
    assert_eq!(store.bids_for_listing(listing.id).await.unwrap().len(), 1);
}

/// 동시성 입찰 테스트
#[tokio::test]
async fn test_pg_concurrent_bidding() {
    let Some(store) = setup().await else {
        return;
    };
    let seller = create_user(&store, "seller").await;
    let listing = store
        .create_listing(seller.id, new_listing(Decimal::new(1200, 2)))
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 1..=20 {
        let store = Arc::clone(&store);
        let bidder = create_user(&store, "bidder").await;
        let listing_id = listing.id;
        let amount = money(&format!("{}.00", 12 + i));
        handles.push(tokio::spawn(async move {
            store.place_bid(listing_id, bidder.id, amount).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(Error::BidTooLow { .. }) => {}
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    let final_listing = store.get_listing(listing.id).await.unwrap().unwrap();
    assert_eq!(final_listing.current_price, Decimal::new(3200, 2));
    assert_eq!(store.bids_for_listing(listing.id).await.unwrap().len(), accepted);
}

/// 사용자 삭제 시 소유 레코드 정리
#[tokio::test]
async fn test_pg_delete_user() {
    let Some(store) = setup().await else {
        return;
    };
    let seller = create_user(&store, "seller").await;
    let buyer = create_user(&store, "buyer").await;
    let listing = store
        .create_listing(seller.id, new_listing(Decimal::new(100, 2)))
        .await
        .unwrap();
    store.place_bid(listing.id, buyer.id, money("2")).await.unwrap();
    store.add_comment(listing.id, buyer.id, "좋아요").await.unwrap();
    store.add_to_watchlist(buyer.id, listing.id).await.unwrap();
    store.add_to_watchlist(buyer.id, listing.id).await.unwrap();

    let deleted = store.delete_user(seller.id).await.unwrap();
    assert_eq!(deleted.listings, 1);
    assert_eq!(deleted.bids, 1);
    assert_eq!(deleted.comments, 1);
    assert_eq!(deleted.watchlist_entries, 1);
    assert!(store.get_listing(listing.id).await.unwrap().is_none());
    assert!(store.get_user(buyer.id).await.unwrap().is_some());

    let err = store
        .create_user(&buyer.username, "", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Integrity(_)));
}

/// 존재하지 않는 사용자의 쓰기는 NotFound
#[tokio::test]
async fn test_pg_unknown_user_is_not_found() {
    let Some(store) = setup().await else {
        return;
    };
    let seller = create_user(&store, "seller").await;
    let listing = store
        .create_listing(seller.id, new_listing(Decimal::new(500, 2)))
        .await
        .unwrap();
    let ghost = i64::MAX;

    assert!(matches!(
        store.create_listing(ghost, new_listing(Decimal::new(100, 2))).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.place_bid(listing.id, ghost, money("6")).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.add_comment(listing.id, ghost, "안녕하세요").await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.add_to_watchlist(ghost, listing.id).await,
        Err(Error::NotFound(_))
    ));

    // 거부된 입찰은 가격을 바꾸지 않는다
    let unchanged = store.get_listing(listing.id).await.unwrap().unwrap();
    assert_eq!(unchanged.current_price, Decimal::new(500, 2));
}
