//! `%s` placeholder templates.
//!
//! `%s` takes the next positional value, `%%` is a literal `%`. Any other
//! `%` sequence is copied through untouched.

use crate::contract::Value;
use crate::errors::ContractError;

pub fn count_placeholders(format: &str) -> usize {
    let mut count = 0;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.clone().next() {
                Some('s') => {
                    count += 1;
                    chars.next();
                }
                Some('%') => {
                    chars.next();
                }
                _ => {}
            }
        }
    }
    count
}

/// Fill `format` left to right from `values`.
///
/// The number of placeholders must equal the number of values.
pub fn substitute(format: &str, values: &[&Value]) -> Result<String, ContractError> {
    let expected = count_placeholders(format);
    if expected != values.len() {
        return Err(ContractError::argument(format!(
            "format '{}' has {} placeholders but {} values were supplied",
            format,
            expected,
            values.len()
        )));
    }

    let mut out = String::with_capacity(format.len() + values.len() * 8);
    let mut remaining = values.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.clone().next() {
            Some('s') => {
                chars.next();
                if let Some(value) = remaining.next() {
                    out.push_str(&value.to_string());
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_real_placeholders() {
        assert_eq!(count_placeholders("%s: Object '%s' is null."), 2);
        assert_eq!(count_placeholders("100%% of %s"), 1);
        assert_eq!(count_placeholders("%d %"), 0);
        assert_eq!(count_placeholders("%%s"), 0);
    }

    #[test]
    fn substitutes_left_to_right() {
        let a = Value::from("callerX");
        let b = Value::from("ref");
        let msg = substitute("%s: Object '%s' is null.", &[&a, &b]).unwrap();
        assert_eq!(msg, "callerX: Object 'ref' is null.");
    }

    #[test]
    fn null_and_percent_render_literally() {
        let n = Value::Null;
        let msg = substitute("got %s at 100%% (%d)", &[&n]).unwrap();
        assert_eq!(msg, "got null at 100% (%d)");
    }

    #[test]
    fn values_are_not_reinterpreted() {
        let v = Value::from("%s");
        assert_eq!(substitute("[%s]", &[&v]).unwrap(), "[%s]");
    }

    #[test]
    fn count_mismatch_is_an_argument_error() {
        let v = Value::from("x");
        assert!(matches!(
            substitute("%s %s", &[&v]),
            Err(ContractError::Argument(_))
        ));
        assert!(substitute("none", &[&v]).is_err());
    }
}
