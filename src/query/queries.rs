// region:    --- Users

/// 사용자 생성
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, password_hash, created_at
"#;

/// 사용자 조회
pub const GET_USER: &str =
    "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1";

/// 아이디로 사용자 조회
pub const GET_USER_BY_USERNAME: &str =
    "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1";

/// 사용자 삭제 관련 (소유 상품에 딸린 레코드부터 삭제)
pub const DELETE_WATCHLIST_OF_USER: &str = r#"
    DELETE FROM watchlist
    WHERE user_id = $1
       OR listing_id IN (SELECT id FROM listings WHERE created_by = $1)
"#;
pub const DELETE_COMMENTS_OF_USER: &str = r#"
    DELETE FROM comments
    WHERE author_id = $1
       OR listing_id IN (SELECT id FROM listings WHERE created_by = $1)
"#;
pub const DELETE_BIDS_OF_USER: &str = r#"
    DELETE FROM bids
    WHERE bidder_id = $1
       OR listing_id IN (SELECT id FROM listings WHERE created_by = $1)
"#;
pub const DELETE_LISTINGS_OF_USER: &str = "DELETE FROM listings WHERE created_by = $1";
pub const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

// endregion: --- Users

// region:    --- Listings

/// 상품 등록
pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (title, description, category, image_url, starting_price, current_price, created_by)
    VALUES ($1, $2, $3, $4, $5, $5, $6)
    RETURNING id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at
"#;

/// 상품 조회
pub const GET_LISTING: &str = "SELECT id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at FROM listings WHERE id = $1";

/// 상품 조회 (행 잠금)
pub const GET_LISTING_FOR_UPDATE: &str = "SELECT id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at FROM listings WHERE id = $1 FOR UPDATE";

/// 모든 상품 조회
pub const GET_ALL_LISTINGS: &str = "SELECT id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at FROM listings ORDER BY id DESC";

/// 카테고리별 상품 조회
pub const GET_LISTINGS_IN_CATEGORY: &str = "SELECT id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at FROM listings WHERE category = $1 ORDER BY id DESC";

/// 등록자별 상품 조회
pub const GET_LISTINGS_CREATED_BY: &str = "SELECT id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at FROM listings WHERE created_by = $1 ORDER BY id DESC";

/// 카테고리 목록 조회
pub const GET_CATEGORIES: &str = r#"
    SELECT DISTINCT category FROM listings
    WHERE category IS NOT NULL AND category <> ''
    ORDER BY category
"#;

// endregion: --- Listings

// region:    --- Bids

/// 현재 가격 갱신 (진행 중이고 현재 가격보다 높을 때만)
pub const UPDATE_CURRENT_PRICE: &str = r#"
    UPDATE listings SET current_price = $1
    WHERE id = $2 AND is_open AND current_price < $1
    RETURNING id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at
"#;

/// 입찰 기록 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, bidder_id, amount, created_at
"#;

/// 상품 입찰 조회
pub const GET_LISTING_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, created_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY id DESC
"#;

/// 경매 종료
pub const CLOSE_LISTING: &str = r#"
    UPDATE listings SET is_open = FALSE
    WHERE id = $1
    RETURNING id, title, description, category, image_url, starting_price, current_price, is_open, created_by, created_at
"#;

// endregion: --- Bids

// region:    --- Comments

/// 댓글 추가
pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, author_id, body)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, author_id, body, created_at
"#;

/// 상품 댓글 조회
pub const GET_LISTING_COMMENTS: &str = r#"
    SELECT id, listing_id, author_id, body, created_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY id ASC
"#;

// endregion: --- Comments

// region:    --- Watchlist

/// 관심 목록 추가 (중복은 무시)
pub const INSERT_WATCHLIST: &str = r#"
    INSERT INTO watchlist (user_id, listing_id) VALUES ($1, $2)
    ON CONFLICT (user_id, listing_id) DO NOTHING
"#;

/// 관심 목록 삭제
pub const DELETE_WATCHLIST: &str = "DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2";

/// 사용자 관심 상품 조회
pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.id, l.title, l.description, l.category, l.image_url, l.starting_price,
           l.current_price, l.is_open, l.created_by, l.created_at
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY l.id DESC
"#;

/// 상품을 관심 목록에 둔 사용자 조회
pub const GET_WATCHERS: &str =
    "SELECT user_id FROM watchlist WHERE listing_id = $1 ORDER BY user_id";

/// 관심 목록 포함 여부
pub const IS_WATCHING: &str =
    "SELECT EXISTS (SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2) AS watching";

// endregion: --- Watchlist
