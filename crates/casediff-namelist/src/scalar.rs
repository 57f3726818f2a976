//! Literal grammar shared by namelists and MOM parameter files.
//!
//! Both formats use Fortran-flavoured literals: `.true.`/`.false.` logicals,
//! quoted character strings, `d` exponents on reals, comma-separated arrays
//! and `n*value` repeat counts.

use casediff_types::Value;

/// Parse one literal.
///
/// Unrecognized tokens are kept verbatim as strings; an empty token is
/// [`Value::Null`].
pub fn parse_scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    if let Some(b) = parse_logical(raw) {
        return Value::Bool(b);
    }
    if let Some(s) = unquote(raw) {
        return Value::String(s);
    }
    parse_number(raw).unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Parse the right-hand side of an assignment.
///
/// A single item becomes a scalar, several comma-separated items a
/// [`Value::List`]. Repeat counts (`3*0.0`) are expanded.
pub fn parse_values(raw: &str) -> Value {
    let raw = raw.trim().trim_end_matches(',').trim_end();
    let mut items = Vec::new();
    let mut repeated = false;
    for part in split_unquoted(raw, ',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match split_repeat(part) {
            Some((count, literal)) => {
                repeated = true;
                let value = parse_scalar(literal);
                items.extend(std::iter::repeat(value).take(count));
            }
            None => items.push(parse_scalar(part)),
        }
    }
    match items.len() {
        0 => Value::Null,
        1 if !repeated => items.remove(0),
        _ => Value::List(items),
    }
}

fn parse_logical(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        ".true." | ".t." | "t" | "true" => Some(true),
        ".false." | ".f." | "f" | "false" => Some(false),
        _ => None,
    }
}

fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    if raw.len() < 2 || !raw.ends_with(quote) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    let doubled: String = [quote, quote].iter().collect();
    Some(inner.replace(&doubled, &quote.to_string()))
}

fn parse_number(raw: &str) -> Option<Value> {
    let first = raw.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    let normalized = raw.replace(['d', 'D'], "e");
    if normalized.contains(['.', 'e', 'E']) {
        normalized
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
    } else {
        normalized.parse::<i64>().ok().map(Value::Int)
    }
}

/// `3*0.0` → `(3, "0.0")`. A count must be a plain positive integer.
fn split_repeat(item: &str) -> Option<(usize, &str)> {
    if item.starts_with(['\'', '"']) {
        return None;
    }
    let (count, literal) = item.split_once('*')?;
    let count: usize = count.trim().parse().ok()?;
    (count > 0).then_some((count, literal))
}

/// Byte offset of the first `target` outside a quoted string.
pub(crate) fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == target => return Some(i),
            None => {}
        }
    }
    None
}

/// Split on `sep` wherever it occurs outside a quoted string.
pub(crate) fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, sep) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Drop a trailing `!` comment from one line.
pub(crate) fn strip_comment(line: &str) -> &str {
    match find_unquoted(line, '!') {
        Some(i) => &line[..i],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logicals() {
        assert_eq!(parse_scalar(".true."), Value::Bool(true));
        assert_eq!(parse_scalar(".FALSE."), Value::Bool(false));
        assert_eq!(parse_scalar("T"), Value::Bool(true));
        assert_eq!(parse_scalar("f"), Value::Bool(false));
        assert_eq!(parse_scalar("True"), Value::Bool(true));
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(parse_scalar("'ZM'"), Value::String("ZM".into()));
        assert_eq!(parse_scalar("\"./\""), Value::String("./".into()));
        assert_eq!(parse_scalar("'it''s'"), Value::String("it's".into()));
        assert_eq!(parse_scalar("''"), Value::String(String::new()));
        // Quoted text that looks like a logical stays a string.
        assert_eq!(parse_scalar("'.true.'"), Value::String(".true.".into()));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_scalar("1800"), Value::Int(1800));
        assert_eq!(parse_scalar("-24"), Value::Int(-24));
        assert_eq!(parse_scalar("1.5d-3"), Value::Float(1.5e-3));
        assert_eq!(parse_scalar("1.0D+02"), Value::Float(100.0));
        assert_eq!(parse_scalar("2.5e10"), Value::Float(2.5e10));
        assert_eq!(parse_scalar("0.5"), Value::Float(0.5));
    }

    #[test]
    fn unrecognized_tokens_stay_strings() {
        assert_eq!(parse_scalar("nan"), Value::String("nan".into()));
        assert_eq!(parse_scalar("dog"), Value::String("dog".into()));
        assert_eq!(parse_scalar("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(parse_scalar(""), Value::Null);
    }

    #[test]
    fn lists_and_repeats() {
        assert_eq!(
            parse_values("0, -24, -24,"),
            Value::List(vec![Value::Int(0), Value::Int(-24), Value::Int(-24)])
        );
        assert_eq!(
            parse_values("3*0.0"),
            Value::List(vec![Value::Float(0.0); 3])
        );
        assert_eq!(
            parse_values("'a,b', 'c'"),
            Value::List(vec![Value::String("a,b".into()), Value::String("c".into())])
        );
        assert_eq!(parse_values("  42 "), Value::Int(42));
        assert_eq!(parse_values(""), Value::Null);
    }

    #[test]
    fn star_inside_string_is_not_a_repeat() {
        assert_eq!(parse_values("'2*x'"), Value::String("2*x".into()));
    }

    #[test]
    fn comment_stripping_respects_quotes() {
        assert_eq!(strip_comment("dtime = 1800 ! seconds"), "dtime = 1800 ");
        assert_eq!(strip_comment("msg = 'hi!' ! note"), "msg = 'hi!' ");
        assert_eq!(strip_comment("! whole line"), "");
    }

    #[test]
    fn split_unquoted_keeps_quoted_separators() {
        assert_eq!(split_unquoted("a,'b,c',d", ','), vec!["a", "'b,c'", "d"]);
        assert_eq!(split_unquoted("abc", ','), vec!["abc"]);
    }
}
