// region:    --- Imports
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use tracing::error;

// endregion: --- Imports

// region:    --- Error

/// 경매 마켓 서비스 공통 에러
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("입찰 금액은 현재 가격({current_price})보다 높아야 합니다.")]
    BidTooLow { current_price: Decimal },

    #[error("이미 종료된 경매입니다.")]
    ListingClosed,

    #[error("경매를 종료할 권한이 없습니다.")]
    NotAuthorized,

    #[error("{0}을(를) 찾을 수 없습니다.")]
    NotFound(String),

    #[error("{0}")]
    Integrity(String),

    #[error("로그인이 필요합니다.")]
    Unauthenticated,

    #[error("아이디 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,

    #[error("설정 오류: {0}")]
    Config(String),

    #[error("비밀번호 처리 오류: {0}")]
    Password(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 클라이언트에 전달할 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::BidTooLow { .. } => "BID_TOO_LOW",
            Error::ListingClosed => "LISTING_CLOSED",
            Error::NotAuthorized => "NOT_AUTHORIZED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Integrity(_) => "INTEGRITY_ERROR",
            Error::Unauthenticated => "UNAUTHENTICATED",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::Config(_) | Error::Password(_) | Error::Database(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BidTooLow { .. } => StatusCode::BAD_REQUEST,
            Error::ListingClosed | Error::Integrity(_) => StatusCode::CONFLICT,
            Error::NotAuthorized => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Config(_) | Error::Password(_) | Error::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// 폼 바디 추출 실패 (필드 누락, 잘못된 Content-Type 등)
impl From<FormRejection> for Error {
    fn from(rejection: FormRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

/// 경로의 id를 해석할 수 없으면 해당 자원이 없는 것으로 본다
impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::NotFound(format!("경로 ({})", rejection.body_text()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {:?}", "Error", self);
            // 내부 오류 상세는 노출하지 않는다
            return (
                status,
                Json(serde_json::json!({
                    "error": "서버 내부 오류가 발생했습니다.",
                    "code": self.code(),
                })),
            )
                .into_response();
        }

        let body = match &self {
            Error::BidTooLow { current_price } => serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
                "current_price": current_price,
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "code": self.code(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_too_low_maps_to_bad_request() {
        let err = Error::BidTooLow {
            current_price: Decimal::new(1000, 2),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BID_TOO_LOW");
        assert!(err.to_string().contains("10.00"));
    }

    #[test]
    fn database_errors_are_internal() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
