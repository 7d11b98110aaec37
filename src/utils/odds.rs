use crate::models::NOT_AVAILABLE;
use regex::Regex;
use std::sync::LazyLock;

// Leading price token: optional sign, digits, optional decimal part
static RE_PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?\d+\.?\d*)").unwrap());

/// Normalize the text of one scraped price into decimal-odds notation.
///
/// - empty text becomes `"N/A"`
/// - fractional odds (`5/2`) become `a/b + 1` rounded to 2 places (`"3.5"`)
/// - American odds keep their sign as a display marker: `+200` -> `"+3.0"`,
///   `-110` -> `"-1.91"`
/// - an unsigned number is already decimal and is returned as found
/// - anything else is returned trimmed and unchanged
///
/// Never fails: an arithmetic problem falls back to the closest text seen so far.
pub fn normalize_odds(raw: &str) -> String {
    let text = raw.trim().replace('\u{a0}', " ");
    if text.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    if text.contains('/') {
        return fractional_to_decimal(&text).unwrap_or(text);
    }

    let token = match RE_PRICE_TOKEN.captures(&text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().to_string(),
        None => return text,
    };

    if let Some(price) = token.strip_prefix('+') {
        positive_american_to_decimal(price)
            .map(|decimal| format!("+{}", decimal))
            .unwrap_or(token)
    } else if let Some(price) = token.strip_prefix('-') {
        negative_american_to_decimal(price)
            .map(|decimal| format!("-{}", decimal))
            .unwrap_or(token)
    } else {
        token
    }
}

fn fractional_to_decimal(text: &str) -> Option<String> {
    let mut parts = text.split('/');
    let (numerator, denominator) = match (parts.next(), parts.next(), parts.next()) {
        (Some(n), Some(d), None) => (parse_price(n)?, parse_price(d)?),
        _ => return None,
    };
    if denominator == 0.0 {
        return None;
    }
    round_to_cents(numerator / denominator + 1.0)
}

/// +150 means 150 won on a 100 stake
fn positive_american_to_decimal(price: &str) -> Option<String> {
    let american = parse_price(price)?;
    round_to_cents(american / 100.0 + 1.0)
}

/// -150 means 150 staked to win 100
fn negative_american_to_decimal(price: &str) -> Option<String> {
    let american = parse_price(price)?;
    if american == 0.0 {
        return None;
    }
    round_to_cents(100.0 / american + 1.0)
}

fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimals and render the shortest float text, keeping a
/// trailing `.0` for whole numbers (`3.0`, `2.5`, `1.91`).
fn round_to_cents(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    // formatting rounds the exact binary value, half to even on true ties
    let rounded = format!("{:.2}", value).parse::<f64>().ok()?;
    let text = format!("{:?}", rounded);
    // huge prices switch to exponent form, written with an explicit sign
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => Some(format!("{}e+{}", mantissa, exp)),
        _ => Some(text),
    }
}
