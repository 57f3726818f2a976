//! Fortran namelist parsing.
//!
//! Handles the subset of namelist syntax that CESM's `*_in` files use:
//! `&group ... /` blocks (or `&end`/`$end` terminators), `!` comments,
//! comma-separated assignments that may span lines, and single-index array
//! element assignments such as `fincl1(2) = 'T'`. Group and key names are
//! case-insensitive in Fortran and are lower-cased here.

use casediff_types::{Group, StandardDocument, Value};
use tracing::debug;

use crate::error::{NamelistError, NamelistResult};
use crate::scalar::{find_unquoted, parse_values, strip_comment};

/// Largest 1-based array element a `key(n) = …` assignment may write.
pub const MAX_SUBSCRIPT: usize = 65_536;

/// Parse namelist text into a standard document (group → key → value).
///
/// A group appearing twice is merged, later assignments winning.
pub fn parse_namelist(text: &str) -> NamelistResult<StandardDocument> {
    let cleaned: String = text
        .lines()
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join("\n");

    let mut doc = StandardDocument::new();
    for block in split_groups(&cleaned)? {
        let group = doc.groups.entry(block.name.clone()).or_default();
        parse_group_body(group, &block)?;
    }
    debug!(
        groups = doc.groups.len(),
        keys = doc.key_count(),
        "parsed namelist"
    );
    Ok(doc)
}

struct GroupBlock<'a> {
    name: String,
    body: &'a str,
    line: usize,
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn split_groups(text: &str) -> NamelistResult<Vec<GroupBlock<'_>>> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some(found) = text[pos..].find(['&', '$']) {
        let marker = pos + found;
        let name_start = marker + 1;
        let name_len = text[name_start..]
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(text.len() - name_start);
        let name = text[name_start..name_start + name_len].to_ascii_lowercase();
        let body_start = name_start + name_len;
        if name.is_empty() || name == "end" {
            pos = body_start;
            continue;
        }
        let line = line_of(text, marker);
        let (body_len, terminator_len) = find_terminator(&text[body_start..])
            .ok_or_else(|| NamelistError::UnterminatedGroup {
                name: name.clone(),
                line,
            })?;
        blocks.push(GroupBlock {
            name,
            body: &text[body_start..body_start + body_len],
            line,
        });
        pos = body_start + body_len + terminator_len;
    }
    Ok(blocks)
}

/// Returns `(body_len, terminator_len)` for the first unquoted `/`,
/// `&end` or `$end`.
fn find_terminator(body: &str) -> Option<(usize, usize)> {
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '/' => return Some((i, 1)),
                '&' | '$' => {
                    let rest = &body[i + 1..];
                    let is_end = rest
                        .get(..3)
                        .is_some_and(|word| word.eq_ignore_ascii_case("end"));
                    if is_end && !rest[3..].starts_with(is_ident_char) {
                        return Some((i, 4));
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Start offset of the key (including any subscript) that precedes `eq`.
fn key_start(body: &str, eq: usize) -> Option<usize> {
    let head = body[..eq].trim_end();
    let mut end = head.len();
    if head.ends_with(')') {
        end = head.rfind('(')?;
    }
    let ident = &head[..end];
    let start = ident
        .char_indices()
        .rev()
        .find(|(_, c)| !(is_ident_char(*c) || *c == '%'))
        .map_or(0, |(i, c)| i + c.len_utf8());
    (start < end).then_some(start)
}

/// Split `name(3)` into `("name", Some(3))`. Multi-dimensional or
/// non-numeric subscripts keep no index.
fn split_subscript(raw_key: &str) -> (String, Option<usize>) {
    let raw_key = raw_key.trim();
    match raw_key.split_once('(') {
        Some((name, rest)) => {
            let index = rest
                .trim_end_matches(')')
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|i| *i >= 1);
            (name.trim().to_ascii_lowercase(), index)
        }
        None => (raw_key.to_ascii_lowercase(), None),
    }
}

fn parse_group_body(group: &mut Group, block: &GroupBlock<'_>) -> NamelistResult<()> {
    let body = block.body;
    let invalid = |offset: usize, text: &str| NamelistError::InvalidAssignment {
        line: block.line + body[..offset].matches('\n').count(),
        text: text.trim().to_string(),
    };

    // (key_start, eq) for every assignment, in source order.
    let mut anchors: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;
    while let Some(found) = find_unquoted(&body[pos..], '=') {
        let eq = pos + found;
        let start = key_start(body, eq).ok_or_else(|| invalid(eq, &body[pos..=eq]))?;
        anchors.push((start, eq));
        pos = eq + 1;
    }

    let leading_end = anchors.first().map_or(body.len(), |(start, _)| *start);
    let leading = &body[..leading_end];
    if !leading.trim().trim_matches(',').trim().is_empty() {
        return Err(invalid(0, leading));
    }

    for (i, (start, eq)) in anchors.iter().enumerate() {
        let value_end = anchors.get(i + 1).map_or(body.len(), |(next, _)| *next);
        let (key, index) = split_subscript(&body[*start..*eq]);
        let value = parse_values(&body[eq + 1..value_end]);
        match index {
            Some(index) => {
                let line = block.line + body[..*start].matches('\n').count();
                assign_element(group, key, index, value, line)?;
            }
            None => {
                group.insert(key, value);
            }
        }
    }
    Ok(())
}

/// `key(index) = value` — set one (1-based) element, or a run of elements
/// when the right-hand side is itself a list.
fn assign_element(
    group: &mut Group,
    key: String,
    index: usize,
    value: Value,
    line: usize,
) -> NamelistResult<()> {
    let values = match value {
        Value::List(values) => values,
        single => vec![single],
    };
    let last = index
        .checked_add(values.len().saturating_sub(1))
        .filter(|last| *last <= MAX_SUBSCRIPT)
        .ok_or_else(|| NamelistError::SubscriptOutOfRange {
            key: key.clone(),
            index,
            line,
        })?;

    let slot = group.entry(key).or_insert_with(|| Value::List(Vec::new()));
    if !matches!(slot, Value::List(_)) {
        let first = std::mem::replace(slot, Value::List(vec![]));
        if let Value::List(items) = slot {
            items.push(first);
        }
    }
    let Value::List(items) = slot else {
        return Ok(());
    };
    if !values.is_empty() && items.len() < last {
        items.resize(last, Value::Null);
    }
    for (at, v) in (index - 1..).zip(values) {
        items[at] = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATM_IN: &str = "\
&cam_inparm
 dtime = 1800
 iradsw = 2   ! shortwave every 2 steps
 fincl1 = 'T', 'Q',
     'U'
 inithist = 'YEARLY'
/
&phys_ctl_nl
 deep_scheme = 'ZM'
 use_subcol_microp = .false.
 cld_macmic_num_steps = 3
/
";

    #[test]
    fn parses_groups_and_values() {
        let doc = parse_namelist(ATM_IN).unwrap();
        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.get("cam_inparm", "dtime"), Some(&Value::Int(1800)));
        assert_eq!(doc.get("cam_inparm", "iradsw"), Some(&Value::Int(2)));
        assert_eq!(
            doc.get("cam_inparm", "fincl1"),
            Some(&Value::List(vec![
                Value::String("T".into()),
                Value::String("Q".into()),
                Value::String("U".into()),
            ]))
        );
        assert_eq!(
            doc.get("phys_ctl_nl", "use_subcol_microp"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn names_are_lowercased() {
        let doc = parse_namelist("&CAM_InParm\n DTIME = 1800\n/\n").unwrap();
        assert_eq!(doc.get("cam_inparm", "dtime"), Some(&Value::Int(1800)));
    }

    #[test]
    fn single_line_group_with_commas() {
        let doc = parse_namelist("&ice_nml a = 1, b = .true., c = 'x' /").unwrap();
        let group = doc.group("ice_nml").unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group["b"], Value::Bool(true));
    }

    #[test]
    fn end_terminators() {
        let doc = parse_namelist("$seq_maps\n x = 1\n$end\n&other y = 2 &END").unwrap();
        assert_eq!(doc.get("seq_maps", "x"), Some(&Value::Int(1)));
        assert_eq!(doc.get("other", "y"), Some(&Value::Int(2)));
    }

    #[test]
    fn slash_inside_string_does_not_close_group() {
        let doc = parse_namelist("&g\n path = '/glade/work/inputdata'\n n = 1\n/\n").unwrap();
        assert_eq!(
            doc.get("g", "path"),
            Some(&Value::String("/glade/work/inputdata".into()))
        );
        assert_eq!(doc.get("g", "n"), Some(&Value::Int(1)));
    }

    #[test]
    fn element_assignments_build_a_list() {
        let doc = parse_namelist("&g\n x(2) = 5\n x(1) = 4\n y(3) = 'c'\n/").unwrap();
        assert_eq!(
            doc.get("g", "x"),
            Some(&Value::List(vec![Value::Int(4), Value::Int(5)]))
        );
        assert_eq!(
            doc.get("g", "y"),
            Some(&Value::List(vec![
                Value::Null,
                Value::Null,
                Value::String("c".into())
            ]))
        );
    }

    #[test]
    fn element_assignment_after_scalar() {
        let doc = parse_namelist("&g\n x = 1\n x(3) = 3\n/").unwrap();
        assert_eq!(
            doc.get("g", "x"),
            Some(&Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)]))
        );
    }

    #[test]
    fn repeated_group_merges() {
        let doc = parse_namelist("&g a = 1 /\n&g b = 2, a = 3 /").unwrap();
        let group = doc.group("g").unwrap();
        assert_eq!(group["a"], Value::Int(3));
        assert_eq!(group["b"], Value::Int(2));
    }

    #[test]
    fn group_named_like_end_is_not_a_terminator() {
        let doc = parse_namelist("&a x = 1 /\n&endrun_nl y = 2 /").unwrap();
        assert_eq!(doc.get("endrun_nl", "y"), Some(&Value::Int(2)));
    }

    #[test]
    fn empty_group_is_kept() {
        let doc = parse_namelist("&empty_nl\n/\n").unwrap();
        assert!(doc.group("empty_nl").unwrap().is_empty());
        assert!(doc.is_empty());
    }

    #[test]
    fn unterminated_group_is_an_error() {
        let err = parse_namelist("\n&cam_inparm\n dtime = 1800\n").unwrap_err();
        assert_eq!(
            err,
            NamelistError::UnterminatedGroup {
                name: "cam_inparm".into(),
                line: 2
            }
        );
    }

    #[test]
    fn stray_text_is_an_error() {
        let err = parse_namelist("&g\n garbage\n a = 1\n/").unwrap_err();
        assert!(matches!(err, NamelistError::InvalidAssignment { line: 1, .. }));
    }

    #[test]
    fn huge_subscript_is_an_error() {
        let err = parse_namelist("&g\n x(18446744073709551615) = 1, 2\n/").unwrap_err();
        assert_eq!(
            err,
            NamelistError::SubscriptOutOfRange {
                key: "x".into(),
                index: usize::MAX,
                line: 2
            }
        );

        let err = parse_namelist("&g\n x(100000000) = 1\n/").unwrap_err();
        assert!(matches!(err, NamelistError::SubscriptOutOfRange { index: 100000000, .. }));
    }

    #[test]
    fn subscript_run_past_limit_is_an_error() {
        let text = format!("&g\n x({MAX_SUBSCRIPT}) = 1, 2\n/");
        assert!(matches!(
            parse_namelist(&text),
            Err(NamelistError::SubscriptOutOfRange { .. })
        ));

        let text = format!("&g\n x({MAX_SUBSCRIPT}) = 7\n/");
        let doc = parse_namelist(&text).unwrap();
        let Some(Value::List(items)) = doc.get("g", "x") else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), MAX_SUBSCRIPT);
        assert_eq!(items[MAX_SUBSCRIPT - 1], Value::Int(7));
    }

    #[test]
    fn comments_and_text_outside_groups_ignored() {
        let doc = parse_namelist("! header comment & stuff\nnot a group\n&g a = 1 /\n").unwrap();
        assert_eq!(doc.groups.len(), 1);
    }
}
