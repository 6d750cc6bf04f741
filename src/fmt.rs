use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a classified row timestamp ("date time" textual form) into epoch
/// seconds. Malformed input degrades to epoch zero — rows with broken
/// timestamps sort first instead of blowing up the session.
pub fn parse_timestamp(raw: &str) -> i64 {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Parse a loosely formatted amount. Tolerates thousands separators and
/// decimal-comma notation ("1,234.56", "1.234,56", "0,5"). Unparseable
/// input yields zero.
pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return 0.0;
    }
    let cleaned = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            // Both present: whichever comes last is the decimal separator.
            let decimal = if dot > comma { '.' } else { ',' };
            s.chars()
                .filter(|&c| c == decimal || (c != '.' && c != ','))
                .map(|c| if c == decimal { '.' } else { c })
                .collect()
        }
        (None, Some(_)) => {
            if s.matches(',').count() > 1 {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        _ => s,
    };
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Format an amount for display: thousands separators, up to four decimals
/// with trailing zeros trimmed.
pub fn amount(val: f64) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.4}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let dec = dec_part.trim_end_matches('0');
    let body = if dec.is_empty() {
        with_commas
    } else {
        format!("{with_commas}.{dec}")
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Shorten a long base58 string for table display: first and last four
/// characters around an ellipsis.
pub fn shorten(addr: &str) -> String {
    // char counts, not byte offsets: edited labels can be non-ASCII
    let count = addr.chars().count();
    if count <= 12 {
        return addr.to_string();
    }
    let head: String = addr.chars().take(4).collect();
    let tail: String = addr.chars().skip(count - 4).collect();
    format!("{head}\u{2026}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-01 00:00:00"), 0);
        assert_eq!(parse_timestamp("1970-01-01 00:01:00"), 60);
        assert!(parse_timestamp("2025-03-01 12:00:00") > parse_timestamp("2025-02-28 12:00:00"));
    }

    #[test]
    fn test_parse_timestamp_malformed_is_epoch_zero() {
        assert_eq!(parse_timestamp(""), 0);
        assert_eq!(parse_timestamp("not a date"), 0);
        assert_eq!(parse_timestamp("2025-03-01"), 0);
        assert_eq!(parse_timestamp("03/01/2025 12:00"), 0);
    }

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("1.5"), 1.5);
        assert_eq!(parse_amount("-42"), -42.0);
        assert_eq!(parse_amount("0"), 0.0);
    }

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("0,5"), 0.5);
        assert_eq!(parse_amount("1,234,567"), 1234567.0);
        assert_eq!(parse_amount(" 12 345.6 "), 12345.6);
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("1.2.3.4"), 0.0);
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(1234.5), "1,234.5");
        assert_eq!(amount(-500.0), "-500");
        assert_eq!(amount(0.0), "0");
        assert_eq!(amount(0.1234), "0.1234");
        assert_eq!(amount(1000000.25), "1,000,000.25");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("SOL"), "SOL");
        assert_eq!(
            shorten("4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp"),
            "4fYN\u{2026}PYvp"
        );
    }

    #[test]
    fn test_shorten_multibyte_label() {
        // user-edited labels are arbitrary text; must never split a char
        assert_eq!(shorten("日本語テスト取引所"), "日本語テスト取引所");
        assert_eq!(
            shorten("日本語テスト取引所マーケット拠点"),
            "日本語テ\u{2026}ット拠点"
        );
        assert_eq!(shorten("márket-label-über-long"), "márk\u{2026}long");
    }
}
