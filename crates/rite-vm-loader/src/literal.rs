//! Textual number literals stored in constant pools
//!
//! Parsing is lenient: the longest numeric prefix wins and anything after it
//! is ignored. A payload without a numeric prefix decodes to zero rather than
//! failing the load.

use rite_vm_bytecode::Constant;

/// Decode a base-10 integer literal. Values outside `i64` become floats.
pub(crate) fn parse_integer(raw: &[u8]) -> Constant {
    let (negative, rest) = split_sign(trim_start(raw));
    let (digits, _) = scan_digits(rest);
    if digits.is_empty() {
        return Constant::Integer(0);
    }

    let mut text = String::with_capacity(digits.len() + 1);
    if negative {
        text.push('-');
    }
    text.push_str(&digits);

    match text.parse::<i64>() {
        Ok(n) => Constant::Integer(n),
        Err(_) => Constant::Float(text.parse::<f64>().unwrap_or(0.0)),
    }
}

/// Decode a floating-point literal
pub(crate) fn parse_float(raw: &[u8]) -> f64 {
    let (negative, rest) = split_sign(trim_start(raw));
    let sign = if negative { -1.0 } else { 1.0 };

    if let Some(special) = parse_special(rest) {
        return sign * special;
    }

    let (int_part, mut rest) = scan_digits(rest);
    let mut text = int_part;

    if let Some((b'.', after_dot)) = rest.split_first() {
        let (frac, after) = scan_digits(after_dot);
        if !frac.is_empty() {
            text.push('.');
            text.push_str(&frac);
            rest = after;
        }
    }
    if text.is_empty() {
        return 0.0;
    }

    if let Some((b'e' | b'E', after_e)) = rest.split_first() {
        let (exp_negative, after_sign) = split_sign(after_e);
        let (exp, _) = scan_digits(after_sign);
        if !exp.is_empty() {
            text.push('e');
            if exp_negative {
                text.push('-');
            }
            text.push_str(&exp);
        }
    }

    sign * text.parse::<f64>().unwrap_or(0.0)
}

fn trim_start(raw: &[u8]) -> &[u8] {
    let start = raw
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(raw.len());
    &raw[start..]
}

fn split_sign(raw: &[u8]) -> (bool, &[u8]) {
    match raw.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, raw),
    }
}

/// Leading decimal digits with single `_` separators between them
fn scan_digits(raw: &[u8]) -> (String, &[u8]) {
    let mut digits = String::new();
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b.is_ascii_digit() {
            digits.push(b as char);
            i += 1;
        } else if b == b'_'
            && !digits.is_empty()
            && raw.get(i + 1).is_some_and(u8::is_ascii_digit)
        {
            i += 1;
        } else {
            break;
        }
    }
    (digits, &raw[i..])
}

fn parse_special(raw: &[u8]) -> Option<f64> {
    let starts_with = |word: &[u8]| {
        raw.len() >= word.len() && raw[..word.len()].eq_ignore_ascii_case(word)
    };
    if starts_with(b"inf") {
        Some(f64::INFINITY)
    } else if starts_with(b"nan") {
        Some(f64::NAN)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(parse_integer(b"42"), Constant::Integer(42));
        assert_eq!(parse_integer(b"-17"), Constant::Integer(-17));
        assert_eq!(parse_integer(b"  +8"), Constant::Integer(8));
        assert_eq!(parse_integer(b"1_000_000"), Constant::Integer(1_000_000));
        assert_eq!(parse_integer(b"12abc"), Constant::Integer(12));
        assert_eq!(parse_integer(b"1__2"), Constant::Integer(1));
        assert_eq!(parse_integer(b""), Constant::Integer(0));
        assert_eq!(parse_integer(b"-"), Constant::Integer(0));
        assert_eq!(parse_integer(b"_1"), Constant::Integer(0));
    }

    #[test]
    fn test_integer_extremes() {
        assert_eq!(
            parse_integer(b"9223372036854775807"),
            Constant::Integer(i64::MAX)
        );
        assert_eq!(
            parse_integer(b"-9223372036854775808"),
            Constant::Integer(i64::MIN)
        );
        assert_eq!(
            parse_integer(b"9223372036854775808"),
            Constant::Float(9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(parse_float(b"1.5"), 1.5);
        assert_eq!(parse_float(b"-0.25"), -0.25);
        assert_eq!(parse_float(b"3"), 3.0);
        assert_eq!(parse_float(b".5"), 0.5);
        assert_eq!(parse_float(b"2.5e3"), 2500.0);
        assert_eq!(parse_float(b"1E-2"), 0.01);
        assert_eq!(parse_float(b"7e"), 7.0);
        assert_eq!(parse_float(b"7."), 7.0);
        assert_eq!(parse_float(b"1_0.0_5"), 10.05);
        assert_eq!(parse_float(b"abc"), 0.0);
        assert_eq!(parse_float(b"."), 0.0);
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(parse_float(b"Infinity"), f64::INFINITY);
        assert_eq!(parse_float(b"-inf"), f64::NEG_INFINITY);
        assert!(parse_float(b"NaN").is_nan());
    }
}
