//! Guide booking price breakdown.
//!
//! All amounts are integer minor units (millimes). The platform keeps a 20%
//! commission, rounded down, and the guide receives the remainder.

use serde::Serialize;
use thiserror::Error;

use crate::entities::user::UserRole;

pub const MIN_HOURS: i32 = 1;
pub const MAX_HOURS: i32 = 8;
pub const COMMISSION_PERCENT: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("hours must be between 1 and 8, got {0}")]
    HoursOutOfRange(i32),
    #[error("the guide has no {0} rate")]
    MissingRate(Segment),
    #[error("the guide's {0} rate is negative")]
    NegativeRate(Segment),
    #[error("price exceeds the supported range")]
    Overflow,
}

/// Which of the guide's two hourly rates applies to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Tourist,
    Local,
}

impl Segment {
    pub fn for_role(role: &UserRole) -> Self {
        match role {
            UserRole::Local => Self::Local,
            _ => Self::Tourist,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tourist => f.write_str("tourist"),
            Self::Local => f.write_str("local"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub total_price: i64,
    pub commission: i64,
    pub net_amount: i64,
}

/// Compute the breakdown for `hours` of guiding at the rate matching `segment`.
pub fn quote(
    rate_tourist: Option<i64>,
    rate_local: Option<i64>,
    segment: Segment,
    hours: i32,
) -> Result<PriceBreakdown, PricingError> {
    if !(MIN_HOURS..=MAX_HOURS).contains(&hours) {
        return Err(PricingError::HoursOutOfRange(hours));
    }

    let rate = match segment {
        Segment::Tourist => rate_tourist,
        Segment::Local => rate_local,
    }
    .ok_or(PricingError::MissingRate(segment))?;

    if rate < 0 {
        return Err(PricingError::NegativeRate(segment));
    }

    let total_price = rate
        .checked_mul(i64::from(hours))
        .ok_or(PricingError::Overflow)?;
    let commission = total_price
        .checked_mul(COMMISSION_PERCENT)
        .ok_or(PricingError::Overflow)?
        / 100;

    Ok(PriceBreakdown {
        total_price,
        commission,
        net_amount: total_price - commission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tourist_three_hours() {
        let price = quote(Some(30), Some(20), Segment::Tourist, 3).unwrap();
        assert_eq!(
            price,
            PriceBreakdown {
                total_price: 90,
                commission: 18,
                net_amount: 72,
            }
        );
    }

    #[test]
    fn test_local_rate_is_used_for_locals() {
        let price = quote(Some(30), Some(20), Segment::Local, 2).unwrap();
        assert_eq!(price.total_price, 40);
        assert_eq!(price.commission, 8);
        assert_eq!(price.net_amount, 32);
    }

    #[test]
    fn test_commission_rounds_down() {
        // 7 * 1 = 7, 20% = 1.4
        let price = quote(Some(7), None, Segment::Tourist, 1).unwrap();
        assert_eq!(price.commission, 1);
        assert_eq!(price.net_amount, 6);
    }

    #[test]
    fn test_breakdown_invariants_hold() {
        for rate in [0_i64, 1, 3, 9, 17, 25_000, 99_999] {
            for hours in MIN_HOURS..=MAX_HOURS {
                let price = quote(Some(rate), Some(rate), Segment::Tourist, hours).unwrap();
                assert_eq!(price.total_price, rate * i64::from(hours));
                assert_eq!(price.commission, price.total_price * 20 / 100);
                assert_eq!(price.net_amount, price.total_price - price.commission);
                assert!(price.commission >= 0);
                assert!(price.net_amount >= 0);
            }
        }
    }

    #[test]
    fn test_hours_out_of_range_rejected() {
        for hours in [-1, 0, 9, 24] {
            assert_eq!(
                quote(Some(30), Some(30), Segment::Tourist, hours),
                Err(PricingError::HoursOutOfRange(hours))
            );
        }
    }

    #[test]
    fn test_missing_and_negative_rates_rejected() {
        assert_eq!(
            quote(Some(30), None, Segment::Local, 2),
            Err(PricingError::MissingRate(Segment::Local))
        );
        assert_eq!(
            quote(Some(-5), Some(10), Segment::Tourist, 2),
            Err(PricingError::NegativeRate(Segment::Tourist))
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            quote(Some(i64::MAX / 2), None, Segment::Tourist, 8),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn test_segment_for_role() {
        assert_eq!(Segment::for_role(&UserRole::Local), Segment::Local);
        assert_eq!(Segment::for_role(&UserRole::Tourist), Segment::Tourist);
        assert_eq!(Segment::for_role(&UserRole::Admin), Segment::Tourist);
    }
}
