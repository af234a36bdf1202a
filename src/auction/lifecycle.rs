/// 경매 종료 및 낙찰자 결정
// region:    --- Imports
use crate::auction::model::{Bid, Listing};
use crate::error::{Error, Result};
use crate::store::EntityStore;
use serde::Serialize;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Lifecycle

/// 경매 종료 명령
#[derive(Debug, Clone, Copy)]
pub struct CloseListingCommand {
    pub listing_id: i64,
    pub requester_id: i64,
}

/// 경매 종료 결과
#[derive(Debug, Clone, Serialize)]
pub struct ClosedListing {
    pub listing: Listing,
    pub winner_id: Option<i64>,
}

/// 종료 권한 확인. 등록자만 종료할 수 있다.
pub fn authorize_close(listing: &Listing, requester_id: i64) -> Result<()> {
    if listing.created_by != requester_id {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// 최종 현재 가격과 같은 금액의 입찰자가 낙찰자
///
/// 입찰 금액은 상품별로 엄격히 증가하므로 일치하는 입찰은 최대 하나다.
pub fn determine_winner(listing: &Listing, bids: &[Bid]) -> Option<i64> {
    bids.iter()
        .find(|bid| bid.listing_id == listing.id && bid.amount == listing.current_price)
        .map(|bid| bid.bidder_id)
}

/// 경매 종료
pub async fn handle_close_listing(
    store: &dyn EntityStore,
    cmd: CloseListingCommand,
) -> Result<ClosedListing> {
    info!("{:<12} --> 경매 종료 요청: {:?}", "Command", cmd);

    let listing = match store.close_listing(cmd.listing_id, cmd.requester_id).await {
        Ok(listing) => listing,
        Err(e) => {
            warn!(
                "{:<12} --> 경매 종료 거절: listing={}, 사유: {}",
                "Command", cmd.listing_id, e
            );
            return Err(e);
        }
    };

    let bids = store.bids_for_listing(listing.id).await?;
    let winner_id = determine_winner(&listing, &bids);
    info!(
        "{:<12} --> 경매 종료: listing={}, 최종 가격 {}, 낙찰자 {:?}",
        "Command", listing.id, listing.current_price, winner_id
    );

    Ok(ClosedListing { listing, winner_id })
}

/// 종료된 경매의 낙찰자 조회. 진행 중이면 None.
pub async fn winner_of(store: &dyn EntityStore, listing: &Listing) -> Result<Option<i64>> {
    if listing.is_open {
        return Ok(None);
    }
    let bids = store.bids_for_listing(listing.id).await?;
    Ok(determine_winner(listing, &bids))
}

// endregion: --- Lifecycle

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn listing(current_price: Decimal) -> Listing {
        Listing {
            id: 7,
            title: "Lamp".to_string(),
            description: "Brass desk lamp".to_string(),
            category: None,
            image_url: None,
            starting_price: Decimal::new(1000, 2),
            current_price,
            is_open: false,
            created_by: 1,
            created_at: Utc::now(),
        }
    }

    fn bid(id: i64, bidder_id: i64, amount: Decimal) -> Bid {
        Bid {
            id,
            listing_id: 7,
            bidder_id,
            amount,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn winner_is_bidder_at_final_price() {
        let bids = vec![
            bid(1, 2, Decimal::new(1001, 2)),
            bid(2, 3, Decimal::new(1500, 2)),
        ];
        assert_eq!(determine_winner(&listing(Decimal::new(1500, 2)), &bids), Some(3));
    }

    #[test]
    fn no_bids_means_no_winner() {
        assert_eq!(determine_winner(&listing(Decimal::new(1000, 2)), &[]), None);
    }

    #[test]
    fn only_creator_may_close() {
        let l = listing(Decimal::new(1000, 2));
        assert!(authorize_close(&l, 1).is_ok());
        assert!(matches!(authorize_close(&l, 2), Err(Error::NotAuthorized)));
    }
}
