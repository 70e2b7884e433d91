//! Property value scanner.
//!
//! Each helper takes the input slice and hands back the parsed piece plus the
//! unconsumed remainder, so callers can chain them.

use super::PropertyValue;

/// Groups nested deeper than this are kept as [`PropertyValue::Raw`] text
pub const MAX_VALUE_DEPTH: usize = 64;

/// Parse a `Key=Value` property line.
///
/// Returns `None` when the line has no usable key. A value that cannot be
/// parsed is returned as [`PropertyValue::Raw`] rather than dropped.
pub fn parse_property_line(line: &str) -> Option<(String, PropertyValue)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(is_property_key_char) {
        return None;
    }
    Some((key.to_string(), parse_top_level_value(value.trim())))
}

fn is_property_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '(' | ')' | '[' | ']')
}

fn is_field_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}

/// Parse a complete right-hand side, falling back to `Raw` on trailing garbage
fn parse_top_level_value(s: &str) -> PropertyValue {
    if s.starts_with('"') || s.starts_with('(') {
        match parse_value(s) {
            Some((value, rest)) if rest.trim().is_empty() => value,
            _ => PropertyValue::Raw(s.to_string()),
        }
    } else {
        PropertyValue::Scalar(s.to_string())
    }
}

/// Parse a single value (quoted string, parenthesized group, or bare token)
/// and return it with the remainder.
///
/// Groups past [`MAX_VALUE_DEPTH`] levels are not descended into. The
/// whole inner group is returned verbatim as [`PropertyValue::Raw`].
pub fn parse_value(s: &str) -> Option<(PropertyValue, &str)> {
    parse_value_at(s, 0)
}

fn parse_value_at(s: &str, depth: usize) -> Option<(PropertyValue, &str)> {
    let s = s.trim_start();
    if s.starts_with('"') {
        let (text, rest) = parse_quoted(s)?;
        Some((PropertyValue::Text(text), rest))
    } else if s.starts_with('(') {
        if depth >= MAX_VALUE_DEPTH {
            let (group, rest) = parse_bare_token(s);
            return Some((PropertyValue::Raw(group.trim().to_string()), rest));
        }
        parse_group(s, depth + 1)
    } else {
        let (token, rest) = parse_bare_token(s);
        Some((PropertyValue::Scalar(token.trim().to_string()), rest))
    }
}

/// Parse a double-quoted string. Returns `None` if the closing quote is missing.
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => return None,
            },
            '"' => return Some((out, &s[i + 1..])),
            _ => out.push(c),
        }
    }
    None
}

/// Read a bare token up to a top-level `,` or `)`
fn parse_bare_token(s: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quote = true,
            '(' => depth += 1,
            ')' if depth == 0 => return (&s[..i], &s[i..]),
            ')' => depth -= 1,
            ',' if depth == 0 => return (&s[..i], &s[i..]),
            _ => {}
        }
    }
    (s, "")
}

/// Split a leading `Key=` off a group item, if present
fn parse_field_key(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_field_key_char(c))?;
    if end == 0 || !s[end..].starts_with('=') {
        return None;
    }
    Some((&s[..end], &s[end + 1..]))
}

/// Parse `( ... )` opened at nesting level `depth`. Keyed items produce a
/// struct, unkeyed items a list.
fn parse_group(s: &str, depth: usize) -> Option<(PropertyValue, &str)> {
    let mut rest = s.strip_prefix('(')?;
    let mut items: Vec<(Option<String>, PropertyValue)> = Vec::new();

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return None;
        }

        let (key, value_start) = match parse_field_key(rest) {
            Some((key, after)) => (Some(key.to_string()), after),
            None => (None, rest),
        };
        let (value, after) = parse_value_at(value_start, depth)?;
        items.push((key, value));

        rest = after.trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after;
        } else if !rest.starts_with(')') {
            return None;
        }
    }

    let value = if items.iter().any(|(k, _)| k.is_some()) {
        PropertyValue::Struct(
            items
                .into_iter()
                .enumerate()
                .map(|(i, (k, v))| (k.unwrap_or_else(|| i.to_string()), v))
                .collect(),
        )
    } else {
        PropertyValue::List(items.into_iter().map(|(_, v)| v).collect())
    };
    Some((value, rest))
}

/// Running parenthesis depth after each `(` or `)` outside quoted strings
fn paren_depths(s: &str) -> impl Iterator<Item = i32> + '_ {
    let mut depth = 0i32;
    let mut in_quote = false;
    let mut escaped = false;
    s.chars().filter_map(move |c| {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            return None;
        }
        match c {
            '"' => in_quote = true,
            '(' => {
                depth += 1;
                return Some(depth);
            }
            ')' => {
                depth -= 1;
                return Some(depth);
            }
            _ => {}
        }
        None
    })
}

/// Net count of unclosed parentheses outside quoted strings
pub(crate) fn paren_balance(s: &str) -> i32 {
    paren_depths(s).last().unwrap_or(0)
}

/// Deepest group nesting on a line
pub(crate) fn max_group_depth(s: &str) -> usize {
    paren_depths(s).max().unwrap_or(0).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> PropertyValue {
        PropertyValue::Text(s.to_string())
    }

    fn scalar(s: &str) -> PropertyValue {
        PropertyValue::Scalar(s.to_string())
    }

    #[test]
    fn test_simple_properties() {
        assert_eq!(parse_property_line("NodePosX=-320"), Some(("NodePosX".into(), scalar("-320"))));
        assert_eq!(
            parse_property_line("NodeGuid=4E9B3C2A41D0"),
            Some(("NodeGuid".into(), scalar("4E9B3C2A41D0")))
        );
        assert_eq!(
            parse_property_line("CustomFunctionName=\"OnHit\""),
            Some(("CustomFunctionName".into(), text("OnHit")))
        );
    }

    #[test]
    fn test_struct_property() {
        let (key, value) = parse_property_line(
            "EventReference=(MemberParent=/Script/CoreUObject.Class'\"/Script/Engine.Actor\"',MemberName=\"ReceiveBeginPlay\")",
        )
        .unwrap();
        assert_eq!(key, "EventReference");
        assert_eq!(value.get("MemberName"), Some(&text("ReceiveBeginPlay")));
        assert_eq!(
            value.get("MemberParent").and_then(|v| v.as_str()),
            Some("/Script/CoreUObject.Class'\"/Script/Engine.Actor\"'")
        );
    }

    #[test]
    fn test_linked_to_list() {
        let (value, _) =
            parse_value("(K2Node_CallFunction_0 8D8A1B2C,K2Node_Knot_1 11AA22BB,)").unwrap();
        assert_eq!(
            value,
            PropertyValue::List(vec![
                scalar("K2Node_CallFunction_0 8D8A1B2C"),
                scalar("K2Node_Knot_1 11AA22BB")
            ])
        );
    }

    #[test]
    fn test_nested_pin_struct() {
        let (value, rest) = parse_value(
            "(PinId=AB12,PinName=\"then\",Direction=\"EGPD_Output\",PinType.PinCategory=\"exec\",LinkedTo=(K2Node_Knot_0 CD34,),bHidden=False) tail",
        )
        .unwrap();
        assert_eq!(rest.trim(), "tail");
        assert_eq!(value.get("PinName"), Some(&text("then")));
        assert_eq!(value.get("PinType.PinCategory"), Some(&text("exec")));
        assert_eq!(value.get("LinkedTo").and_then(|v| v.as_list()).map(|l| l.len()), Some(1));
        assert_eq!(value.get("bHidden").and_then(|v| v.as_bool()), Some(false));
    }

    #[test]
    fn test_escaped_strings() {
        let (_, value) = parse_property_line(r#"DefaultValue="say \"hi\"\nbye""#).unwrap();
        assert_eq!(value, text("say \"hi\"\nbye"));
    }

    #[test]
    fn test_nsloctext_scalar() {
        let line = r#"NodeComment=NSLOCTEXT("K2Node", "Key", "Hello, world")"#;
        let (_, value) = parse_property_line(line).unwrap();
        assert_eq!(value, scalar(r#"NSLOCTEXT("K2Node", "Key", "Hello, world")"#));

        let group = r#"(DefaultTextValue=NSLOCTEXT("", "A", "x, y"),Other=1)"#;
        let (inner, _) = parse_value(group).unwrap();
        assert_eq!(inner.get("Other"), Some(&scalar("1")));
    }

    #[test]
    fn test_malformed_values_become_raw() {
        let (_, value) = parse_property_line("Broken=(A=1,B=\"unterminated").unwrap();
        assert_eq!(value, PropertyValue::Raw("(A=1,B=\"unterminated".into()));

        let (_, value) = parse_property_line("Trailing=\"x\" junk").unwrap();
        assert!(matches!(value, PropertyValue::Raw(_)));
    }

    #[test]
    fn test_rejects_lines_without_key() {
        assert!(parse_property_line("no equals sign here").is_none());
        assert!(parse_property_line("=value").is_none());
        assert!(parse_property_line("bad key=1").is_none());
    }

    #[test]
    fn test_indexed_and_dotted_keys() {
        let (key, _) = parse_property_line("Pins(0)=EdGraphPin'EdGraphPin_0'").unwrap();
        assert_eq!(key, "Pins(0)");
        let (key, _) = parse_property_line("PinType.PinCategory=\"bool\"").unwrap();
        assert_eq!(key, "PinType.PinCategory");
    }

    #[test]
    fn test_paren_balance() {
        assert_eq!(paren_balance("A=(B=1,"), 1);
        assert_eq!(paren_balance("A=(B=\")\")"), 0);
        assert_eq!(paren_balance("C=2))"), -2);
    }

    #[test]
    fn test_max_group_depth() {
        assert_eq!(max_group_depth("A=1"), 0);
        assert_eq!(max_group_depth("A=((1),(2))"), 2);
        assert_eq!(max_group_depth("A=(B=\"(((\")"), 1);
    }

    #[test]
    fn test_deep_nesting_is_kept_raw() {
        let line = format!("Weird={}{}", "(".repeat(5_000), ")".repeat(5_000));
        let (key, value) = parse_property_line(&line).unwrap();
        assert_eq!(key, "Weird");

        let mut current = &value;
        let mut levels = 0;
        while let PropertyValue::List(items) = current {
            assert_eq!(items.len(), 1);
            current = &items[0];
            levels += 1;
        }
        assert_eq!(levels, MAX_VALUE_DEPTH);
        let inner = 5_000 - MAX_VALUE_DEPTH;
        let raw = format!("{}{}", "(".repeat(inner), ")".repeat(inner));
        assert_eq!(current, &PropertyValue::Raw(raw));
    }

    #[test]
    fn test_raw_group_keeps_following_fields() {
        let deep = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        let input = format!("(Deep={},Next=1)", deep);
        let (value, rest) = parse_value(&input).unwrap();
        assert!(rest.is_empty());
        assert_eq!(value.get("Next"), Some(&scalar("1")));
        assert!(value.get("Deep").is_some());
    }

    #[test]
    fn test_empty_group() {
        let (value, _) = parse_value("()").unwrap();
        assert_eq!(value.as_list().map(|l| l.len()), Some(0));
    }
}
