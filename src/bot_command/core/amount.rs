use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ParseError;

static DECIMAL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$").unwrap());

static MAGNITUDE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)([十百千万萬亿億]?)").unwrap());

const AMOUNT_CAP: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn multiplier(glyph: &str) -> Decimal {
    match glyph {
        "十" => Decimal::TEN,
        "百" => Decimal::ONE_HUNDRED,
        "千" => Decimal::ONE_THOUSAND,
        "万" | "萬" => Decimal::from(10_000),
        "亿" | "億" => Decimal::from(100_000_000),
        _ => Decimal::ONE,
    }
}

fn is_kept(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || "十百千万萬亿億".contains(c)
}

/// Parses a USD amount such as `500000`, `1,250.50`, `50万` or `1万2千3百50`.
/// The result is within `(0, 1e9]`.
pub fn parse_amount(text: &str) -> Result<Decimal, ParseError> {
    let token: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if token.is_empty() {
        return Err(ParseError::Empty);
    }

    let value = if DECIMAL_LITERAL.is_match(&token) {
        Decimal::from_str(&token.replace(',', ""))
            .map_err(|_| ParseError::NoAmount(text.trim().to_owned()))?
    } else {
        if token.starts_with(['-', '−']) {
            return Err(ParseError::NonPositive);
        }
        let cleaned: String = token.chars().filter(|c| is_kept(*c)).collect();
        let segments: Vec<_> = MAGNITUDE_SEGMENT.captures_iter(&cleaned).collect();
        // Segments must tile the cleaned token; a stray `.` between them means garbage like `1.5.5`.
        let mut covered = 0;
        for segment in &segments {
            let whole = segment.get(0).map_or(0..0, |m| m.range());
            if whole.start != covered {
                return Err(ParseError::NoAmount(text.trim().to_owned()));
            }
            covered = whole.end;
        }
        if segments.is_empty() || covered != cleaned.len() {
            return Err(ParseError::NoAmount(text.trim().to_owned()));
        }
        let mut total = Decimal::ZERO;
        for segment in &segments {
            let number = Decimal::from_str(&segment[1])
                .map_err(|_| ParseError::NoAmount(text.trim().to_owned()))?;
            total = number
                .checked_mul(multiplier(&segment[2]))
                .and_then(|value| total.checked_add(value))
                .ok_or(ParseError::TooLarge)?;
        }
        total
    };

    if value <= Decimal::ZERO {
        return Err(ParseError::NonPositive);
    }
    if value > AMOUNT_CAP {
        return Err(ParseError::TooLarge);
    }
    Ok(value.normalize())
}

/// Parses a fee percentage in `[0, 100]`, with an optional trailing `%`.
pub fn parse_fee_percent(text: &str) -> Result<Decimal, ParseError> {
    let token = text.trim().trim_end_matches(['%', '％']).trim();
    let fee = Decimal::from_str(token).map_err(|_| ParseError::InvalidFee(text.trim().to_owned()))?;
    if fee < Decimal::ZERO || fee > Decimal::ONE_HUNDRED {
        return Err(ParseError::FeeOutOfRange);
    }
    Ok(fee.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_literals() {
        assert_eq!(parse_amount("500000"), Ok(dec!(500000)));
        assert_eq!(parse_amount("1,250.50"), Ok(dec!(1250.5)));
        assert_eq!(parse_amount(" 0.01 "), Ok(dec!(0.01)));
        assert_eq!(parse_amount("1000000000"), Ok(dec!(1000000000)));
    }

    #[test]
    fn magnitude_words() {
        assert_eq!(parse_amount("50万"), Ok(dec!(500000)));
        assert_eq!(parse_amount("1万2千3百50"), Ok(dec!(12350)));
        assert_eq!(parse_amount("3.5万"), Ok(dec!(35000)));
        assert_eq!(parse_amount("2亿"), Ok(dec!(200000000)));
        assert_eq!(parse_amount("5十"), Ok(dec!(50)));
        assert_eq!(parse_amount("1,000万"), Ok(dec!(10000000)));
    }

    #[test]
    fn surrounding_noise_is_stripped() {
        assert_eq!(parse_amount("50万美元"), Ok(dec!(500000)));
        assert_eq!(parse_amount("$2000"), Ok(dec!(2000)));
        assert_eq!(parse_amount("1200 USD"), Ok(dec!(1200)));
    }

    #[test]
    fn stray_separators_are_not_summed() {
        assert_eq!(
            parse_amount("1.5.5"),
            Err(ParseError::NoAmount("1.5.5".to_owned()))
        );
        assert_eq!(
            parse_amount("1万.5"),
            Err(ParseError::NoAmount("1万.5".to_owned()))
        );
        assert_eq!(parse_amount("1.5万"), Ok(dec!(15000)));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(parse_amount("0"), Err(ParseError::NonPositive));
        assert_eq!(parse_amount("0万"), Err(ParseError::NonPositive));
        assert_eq!(parse_amount("-5"), Err(ParseError::NonPositive));
        assert_eq!(parse_amount("-5万"), Err(ParseError::NonPositive));
        assert_eq!(parse_amount("1000000001"), Err(ParseError::TooLarge));
        assert_eq!(parse_amount("11亿"), Err(ParseError::TooLarge));
    }

    #[test]
    fn rejects_text_without_digits() {
        assert_eq!(parse_amount(""), Err(ParseError::Empty));
        assert_eq!(
            parse_amount("很多钱"),
            Err(ParseError::NoAmount("很多钱".to_owned()))
        );
        assert!(matches!(parse_amount("万"), Err(ParseError::NoAmount(_))));
    }

    #[test]
    fn fee_percentages() {
        assert_eq!(parse_fee_percent("2.3"), Ok(dec!(2.3)));
        assert_eq!(parse_fee_percent("2.5%"), Ok(dec!(2.5)));
        assert_eq!(parse_fee_percent(" 1 ％"), Ok(dec!(1)));
        assert_eq!(parse_fee_percent("0"), Ok(dec!(0)));
        assert_eq!(parse_fee_percent("100"), Ok(dec!(100)));
        assert_eq!(parse_fee_percent("100.5"), Err(ParseError::FeeOutOfRange));
        assert_eq!(parse_fee_percent("-1"), Err(ParseError::FeeOutOfRange));
        assert_eq!(
            parse_fee_percent("是"),
            Err(ParseError::InvalidFee("是".to_owned()))
        );
    }
}
