use rust_decimal::{Decimal, RoundingStrategy};

use super::RateQuote;

/// Fractional digits kept for every figure of a conversion.
pub const DIGITS: u32 = 6;

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234567.5` -> `1,234,567.500000`
pub fn format_amount(value: Decimal) -> String {
    let fixed = format!("{:.*}", DIGITS as usize, round(value));
    let (sign, fixed) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, digit) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Fee-inclusive conversion of a USD amount into CNY.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub principal_usd: Decimal,
    pub fee_percent: Decimal,
    pub fee_exclusive_cny: Decimal,
    pub fee_usd: Decimal,
    pub fee_cny: Decimal,
    pub total_usd: Decimal,
    pub total_cny: Decimal,
    pub effective_rate: Decimal,
    quote: RateQuote,
}

impl ConversionResult {
    /// `None` when a figure falls outside what `Decimal` can hold.
    pub fn compute(amount_usd: Decimal, quote: &RateQuote, fee_percent: Decimal) -> Option<Self> {
        let rate = quote.per_unit_rate();
        let fee_exclusive_cny = round(amount_usd.checked_mul(rate)?);
        let fee_cny = round(
            fee_exclusive_cny
                .checked_mul(fee_percent)?
                .checked_div(Decimal::ONE_HUNDRED)?,
        );
        let fee_usd = round(fee_cny.checked_div(rate)?);
        let total_cny = round(fee_exclusive_cny.checked_add(fee_cny)?);
        let total_usd = round(amount_usd.checked_add(fee_usd)?);
        let effective_rate = round(total_cny.checked_div(amount_usd)?);
        Some(Self {
            principal_usd: round(amount_usd),
            fee_percent,
            fee_exclusive_cny,
            fee_usd,
            fee_cny,
            total_usd,
            total_cny,
            effective_rate,
            quote: quote.clone(),
        })
    }

    fn rate_line(&self) -> String {
        format!(
            "汇率：100 USD = {} CNY（发布时间 {}）",
            self.quote.raw_100_rate().normalize(),
            self.quote.published_at().unwrap_or("未知"),
        )
    }

    pub fn terse(&self) -> String {
        format!(
            "金额：{} USD\n含手续费合计：{} CNY\n{}",
            format_amount(self.principal_usd),
            format_amount(self.total_cny),
            self.rate_line(),
        )
    }

    pub fn detailed(&self) -> String {
        format!(
            "本金：{} USD\n不含手续费：{} CNY\n手续费 {}%：{} USD / {} CNY\n合计：{} USD / {} CNY\n综合汇率：{} CNY per USD\n{}",
            format_amount(self.principal_usd),
            format_amount(self.fee_exclusive_cny),
            self.fee_percent.normalize(),
            format_amount(self.fee_usd),
            format_amount(self.fee_cny),
            format_amount(self.total_usd),
            format_amount(self.total_cny),
            format_amount(self.effective_rate),
            self.rate_line(),
        )
    }
}
