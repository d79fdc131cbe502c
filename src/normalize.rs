//! Cross-source record normalization.
//!
//! Converts a [`RawRecord`] from either source into a [`NormalizedResult`],
//! splitting each price into a display string and a numeric value once, so
//! nothing downstream has to re-parse formatted currency.

use crate::models::{NormalizedResult, RawRecord};

/// Normalize one raw record into the canonical shape.
pub fn normalize(record: &RawRecord) -> NormalizedResult {
    let sold_price_display = record.sold_price_display();
    let bid_amount_display = record.bid_amount_display();
    let sold = record.is_sold();
    let numeric_price = if sold {
        parse_price(&sold_price_display)
    } else {
        parse_price(&bid_amount_display)
    };

    let status = record
        .status()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    match record {
        RawRecord::Store(r) => NormalizedResult {
            title: decode_html_entities(r.title.as_deref().unwrap_or_default()),
            year: r.year,
            make: r.make.clone().unwrap_or_default(),
            model: r.model.clone().unwrap_or_default(),
            sold_price_display,
            bid_amount_display,
            numeric_price,
            sold_date: r.sold_date.clone(),
            status,
            url: r.url.clone(),
            mileage: r.mileage,
            bidders: r.bidders,
            watchers: r.watchers,
            comments: r.comments,
            image_url: r.image_url.clone(),
            transmission: r.transmission.clone(),
        },
        RawRecord::Retrieved(r) => NormalizedResult {
            title: decode_html_entities(r.title.as_deref().unwrap_or_default()),
            year: r.year,
            make: r.make.clone().unwrap_or_default(),
            model: r.model.clone().unwrap_or_default(),
            sold_price_display,
            bid_amount_display,
            numeric_price,
            sold_date: r.sold_date.clone(),
            status,
            url: r.url.clone(),
            mileage: r.mileage,
            bidders: r.bidders,
            watchers: r.watchers,
            comments: r.comments,
            image_url: r.image_url.clone(),
            transmission: r.transmission.clone(),
        },
    }
}

/// Normalize a whole result set, preserving order.
pub fn normalize_all(records: &[RawRecord]) -> Vec<NormalizedResult> {
    records.iter().map(normalize).collect()
}

/// Derive a number from a price string.
///
/// Keeps only ASCII digits and `.`, then parses as `f64`. Anything that
/// does not parse (empty, `"Not sold"`, `"1.2.3"`) yields `0.0`.
pub fn parse_price(display: &str) -> f64 {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Format an amount as US dollars, e.g. `$12,345` or `$12,345.50`.
///
/// Whole amounts carry no cents, so [`parse_price`] recovers the exact value.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 { "-" } else { "" };
    if cents == "00" {
        format!("{sign}${}", group_thousands(whole))
    } else {
        format!("{sign}${}.{cents}", group_thousands(whole))
    }
}

/// Format an amount as whole US dollars, rounding half away from zero.
pub fn format_usd_rounded(amount: f64) -> String {
    format_usd(amount.round())
}

/// Insert `,` every three digits from the right.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Decode the HTML entities that listing titles commonly carry.
///
/// Unknown or malformed entities are left untouched.
pub fn decode_html_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        // Longest entity we decode is `&hellip;`; allow some slack for numerics.
        let decoded = candidate
            .char_indices()
            .take(12)
            .find(|(_, c)| *c == ';')
            .and_then(|(end, _)| decode_entity(&candidate[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(c)
}
