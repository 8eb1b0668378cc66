//! Property-list accessors for s-expression messages.
//!
//! Messages are flat plists such as `(:type :frame :id 3 ...)`.  Keywords
//! may arrive as `Value::Keyword("key")` or `Value::Symbol(":key")`
//! depending on parser options, so both are accepted.

use lexpr::Value;

/// Whether `v` is the keyword `key` in either parser form.
fn is_keyword(v: &Value, key: &str) -> bool {
    match v {
        Value::Keyword(k) => k.as_ref() == key,
        Value::Symbol(s) => s.strip_prefix(':') == Some(key),
        _ => false,
    }
}

/// The raw value following `:key` in a plist.
///
/// Only key positions are matched, so a value spelled like a key is never
/// mistaken for one.
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = value;
    while let Value::Cons(pair) = current {
        let Value::Cons(next) = pair.cdr() else {
            return None;
        };
        if is_keyword(pair.car(), key) {
            return Some(next.car());
        }
        current = next.cdr();
    }
    None
}

/// The value following `:key`, rendered as a string.
///
/// Keywords lose their leading colon; booleans become `t`/`nil`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => v.strip_prefix(':').unwrap_or(&**v).to_string(),
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => sexp_bool(*b).to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

/// Extract an integer value from a plist.
pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a floating-point value from a plist.
pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean value from a plist.  Anything but `nil` is true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

/// The elements of a proper list, in order.  Non-lists yield nothing.
pub fn list_items(value: &Value) -> Vec<&Value> {
    let mut items = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        items.push(pair.car());
        current = pair.cdr();
    }
    items
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Lisp boolean.
pub fn sexp_bool(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_keyword_from_plist() {
        let v = lexpr::from_str("(:type :frame :id 1)").unwrap();
        assert_eq!(get_keyword(&v, "type"), Some("frame".to_string()));
        assert_eq!(get_keyword(&v, "id"), Some("1".to_string()));
    }

    #[test]
    fn test_get_keyword_string_value() {
        let v = lexpr::from_str("(:hand \"left\")").unwrap();
        assert_eq!(get_keyword(&v, "hand"), Some("left".to_string()));
    }

    #[test]
    fn test_get_keyword_missing_key() {
        let v = lexpr::from_str("(:type :status)").unwrap();
        assert_eq!(get_keyword(&v, "hand"), None);
    }

    #[test]
    fn test_get_keyword_trailing_key() {
        let v = lexpr::from_str("(:type)").unwrap();
        assert_eq!(get_keyword(&v, "type"), None);
    }

    #[test]
    fn test_get_keyword_empty_list() {
        let v = lexpr::from_str("()").unwrap();
        assert_eq!(get_keyword(&v, "type"), None);
    }

    #[test]
    fn test_get_keyword_skips_values_named_like_keys() {
        let v = lexpr::from_str("(:hand :state :state :closed)").unwrap();
        assert_eq!(get_keyword(&v, "state"), Some("closed".to_string()));
        assert_eq!(get_keyword(&v, "hand"), Some("state".to_string()));
        let v = lexpr::from_str("(:type :id :id 4)").unwrap();
        assert_eq!(get_int(&v, "id"), Some(4));
    }

    #[test]
    fn test_get_int() {
        let v = lexpr::from_str("(:id 42 :dx -7 :hand :left)").unwrap();
        assert_eq!(get_int(&v, "id"), Some(42));
        assert_eq!(get_int(&v, "dx"), Some(-7));
        assert_eq!(get_int(&v, "hand"), None);
    }

    #[test]
    fn test_get_float() {
        let v = lexpr::from_str("(:x 0.25 :y -1 :z 2.5)").unwrap();
        assert_eq!(get_float(&v, "x"), Some(0.25));
        assert_eq!(get_float(&v, "y"), Some(-1.0));
        assert_eq!(get_float(&v, "z"), Some(2.5));
    }

    #[test]
    fn test_get_bool() {
        let v = lexpr::from_str("(:tracked t :lost nil)").unwrap();
        assert_eq!(get_bool(&v, "tracked"), Some(true));
        assert_eq!(get_bool(&v, "lost"), Some(false));
        assert_eq!(get_bool(&v, "other"), None);
    }

    #[test]
    fn test_get_value_nested() {
        let v = lexpr::from_str("(:head (:x 1 :y 2) :id 3)").unwrap();
        let head = get_value(&v, "head").unwrap();
        assert_eq!(get_int(head, "y"), Some(2));
        assert_eq!(get_int(&v, "id"), Some(3));
    }

    #[test]
    fn test_list_items() {
        let v = lexpr::from_str("((:a 1) (:a 2) (:a 3))").unwrap();
        let items = list_items(&v);
        assert_eq!(items.len(), 3);
        assert_eq!(get_int(items[2], "a"), Some(3));
        assert!(list_items(&lexpr::from_str("()").unwrap()).is_empty());
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("plain"), "plain");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_sexp_bool() {
        assert_eq!(sexp_bool(true), "t");
        assert_eq!(sexp_bool(false), "nil");
    }
}
