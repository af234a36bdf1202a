/// 입찰 관련 커맨드 처리
/// 1. 입찰 판정 (저장소 구현체가 원자적 구간 안에서 호출)
/// 2. 입찰
// region:    --- Imports
use crate::auction::model::{Bid, Listing};
use crate::error::{Error, Result};
use crate::money::Money;
use crate::store::EntityStore;
use serde::Serialize;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: Money,
}

/// 입찰 성공 결과
#[derive(Debug, Clone, Serialize)]
pub struct BidPlaced {
    pub bid: Bid,
    pub listing: Listing,
}

/// 1. 입찰 판정
///
/// 종료된 경매는 금액과 관계없이 거절하고, 그 외에는 현재 가격보다
/// 엄격히 높은 금액만 받는다. 입찰이 없는 상품의 현재 가격은 시작가이다.
pub fn evaluate_bid(listing: &Listing, amount: Money) -> Result<()> {
    if !listing.is_open {
        return Err(Error::ListingClosed);
    }
    if amount.amount() <= listing.current_price {
        return Err(Error::BidTooLow {
            current_price: listing.current_price,
        });
    }
    Ok(())
}

/// 2. 입찰
pub async fn handle_place_bid(store: &dyn EntityStore, cmd: PlaceBidCommand) -> Result<BidPlaced> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    match store
        .place_bid(cmd.listing_id, cmd.bidder_id, cmd.amount)
        .await
    {
        Ok((bid, listing)) => {
            info!(
                "{:<12} --> 입찰 성공: listing={}, 현재 가격 {}",
                "Command", listing.id, listing.current_price
            );
            Ok(BidPlaced { bid, listing })
        }
        Err(e) => {
            warn!(
                "{:<12} --> 입찰 거절: listing={}, 사유: {}",
                "Command", cmd.listing_id, e
            );
            Err(e)
        }
    }
}

// endregion: --- Commands
