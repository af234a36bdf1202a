use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 통화 소수 자릿수
pub const CURRENCY_SCALE: u32 = 2;

/// 저장 컬럼 NUMERIC(12,2)의 최대 자릿수
pub const CURRENCY_PRECISION: u32 = 12;

/// 검증된 통화 금액 (0.01 이상 9999999999.99 이하, 소수 둘째 자리까지)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// 최소 금액 0.01
    pub fn min() -> Self {
        Money(Decimal::new(1, CURRENCY_SCALE))
    }

    /// 최대 금액 9999999999.99
    pub fn max() -> Self {
        Money(Decimal::new(10i64.pow(CURRENCY_PRECISION) - 1, CURRENCY_SCALE))
    }

    pub fn new(value: Decimal) -> Result<Self> {
        let normalized = value.normalize();
        if normalized.scale() > CURRENCY_SCALE {
            return Err(Error::Validation(format!(
                "금액은 소수 {CURRENCY_SCALE}자리까지만 입력할 수 있습니다: {value}"
            )));
        }
        if normalized < Self::min().0 {
            return Err(Error::Validation(format!(
                "금액은 0.01 이상이어야 합니다: {value}"
            )));
        }
        if normalized > Self::max().0 {
            return Err(Error::Validation(format!(
                "금액은 {} 이하여야 합니다: {value}",
                Self::max()
            )));
        }
        let mut scaled = normalized;
        scaled.rescale(CURRENCY_SCALE);
        Ok(Money(scaled))
    }

    /// 폼 텍스트에서 금액 파싱
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("금액을 입력해 주세요.".to_string()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| Error::Validation(format!("올바른 금액이 아닙니다: {trimmed}")))?;
        Self::new(value)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}
