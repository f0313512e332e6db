//! Display formatting for large counts and currency figures.

/// Render a raw count with a K/M/B/T suffix and one decimal place.
/// Values below one thousand are rendered as-is.
pub fn format_large_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.1}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value}")
    }
}

/// Normalize a currency string like `"$16,640,071,091.4"` or `"$8.2B"` to a
/// compact `$X.Y<suffix>` form. Unparseable input is returned unchanged.
pub fn format_tvl(value: &str) -> String {
    let trimmed = value.strip_prefix('$').unwrap_or(value);
    let (digits, suffix) = match trimmed.chars().last() {
        Some(c @ ('K' | 'M' | 'B' | 'T')) => (&trimmed[..trimmed.len() - 1], Some(c)),
        _ => (trimmed, None),
    };

    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    let Ok(number) = cleaned.parse::<f64>() else {
        return value.to_string();
    };

    match suffix {
        Some(c) => format!("${number:.1}{c}"),
        None => format!("${}", format_large_number(number)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_numbers_pick_the_right_suffix() {
        assert_eq!(format_large_number(1_500.0), "1.5K");
        assert_eq!(format_large_number(2_300_000.0), "2.3M");
        assert_eq!(format_large_number(16_600_000_000.0), "16.6B");
        assert_eq!(format_large_number(1_200_000_000_000.0), "1.2T");
        assert_eq!(format_large_number(847.0), "847");
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(format_large_number(-2_500_000.0), "-2.5M");
    }

    #[test]
    fn tvl_with_suffix_is_rounded_in_place() {
        assert_eq!(format_tvl("$16.64B"), "$16.6B");
        assert_eq!(format_tvl("$8.2B"), "$8.2B");
    }

    #[test]
    fn tvl_without_suffix_is_compacted() {
        assert_eq!(format_tvl("$16,640,071,091"), "$16.6B");
        assert_eq!(format_tvl("1500000"), "$1.5M");
    }

    #[test]
    fn unparseable_tvl_is_left_alone() {
        assert_eq!(format_tvl("n/a"), "n/a");
    }
}
