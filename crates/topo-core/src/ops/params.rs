//! Identity parameters taken from request paths

use crate::errors::{Result, TopoError};

/// Path parameter carrying the business id
pub const PARAM_APP_ID: &str = "app_id";
/// Path parameter carrying the set id
pub const PARAM_SET_ID: &str = "set_id";

/// Parse a business id: a positive base-10 integer
///
/// # Errors
///
/// `InvalidParameter` if `raw` is not an integer or is not positive.
pub fn parse_biz_id(raw: &str) -> Result<i64> {
    let biz_id = parse_int(PARAM_APP_ID, raw)?;
    ensure_biz_id(biz_id)?;
    Ok(biz_id)
}

/// Parse a set id: any base-10 integer
///
/// # Errors
///
/// `InvalidParameter` if `raw` is not an integer.
pub fn parse_set_id(raw: &str) -> Result<i64> {
    parse_int(PARAM_SET_ID, raw)
}

/// # Errors
///
/// `InvalidParameter` if `biz_id` is not positive.
pub fn ensure_biz_id(biz_id: i64) -> Result<()> {
    if biz_id <= 0 {
        return Err(TopoError::invalid_parameter(
            PARAM_APP_ID,
            format!("business id must be positive, got {}", biz_id),
        ));
    }
    Ok(())
}

fn parse_int(name: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|e| TopoError::invalid_parameter(name, format!("'{}' is not an integer: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_biz_id() {
        assert_eq!(parse_biz_id("10").unwrap(), 10);
        for bad in ["0", "-4", "ten", "", "1.5", " 10", "10\n"] {
            match parse_biz_id(bad) {
                Err(TopoError::InvalidParameter { name, .. }) => assert_eq!(name, PARAM_APP_ID),
                other => panic!("Expected InvalidParameter for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_parse_set_id() {
        assert_eq!(parse_set_id("7").unwrap(), 7);
        for bad in ["batch", "7 ", "+ 7"] {
            assert!(matches!(
                parse_set_id(bad),
                Err(TopoError::InvalidParameter { .. })
            ));
        }
    }
}
