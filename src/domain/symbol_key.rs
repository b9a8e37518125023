//! Indicator kind to wire key conversion.

/// Converts a mixed-case indicator kind into its upper snake case wire key.
///
/// A `_` is inserted between a lowercase letter or digit and a following
/// uppercase letter, then the whole string is upper-cased:
/// `HeikenAshi` becomes `HEIKEN_ASHI`, `Sma` becomes `SMA`.
pub fn normalize(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len() + 4);
    let mut prev: Option<char> = None;
    for ch in kind.chars() {
        if ch.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word() {
        assert_eq!(normalize("Sma"), "SMA");
        assert_eq!(normalize("Rsi"), "RSI");
        assert_eq!(normalize("Supertrend"), "SUPERTREND");
    }

    #[test]
    fn multi_word() {
        assert_eq!(normalize("HeikenAshi"), "HEIKEN_ASHI");
        assert_eq!(normalize("fooBarBaz"), "FOO_BAR_BAZ");
    }

    #[test]
    fn digit_before_upper() {
        assert_eq!(normalize("Ma2Cross"), "MA2_CROSS");
    }

    #[test]
    fn consecutive_capitals_are_not_split() {
        assert_eq!(normalize("BBands"), "BBANDS");
        assert_eq!(normalize("SMA"), "SMA");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize(""), "");
    }
}
