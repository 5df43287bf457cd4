// dqc-core/src/domain/substitution.rs

// `$name` / `${name}` placeholder substitution that never fails:
// unknown placeholders are left untouched and `$$` collapses to `$`.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn re_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn safe_substitute(template: &str, params: &Map<String, Value>) -> String {
    re_placeholder()
        .replace_all(template, |caps: &Captures| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            match name.and_then(|n| params.get(n)) {
                Some(value) => render_value(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_known_placeholders_are_replaced() {
        let p = params(json!({"column": "amount", "limit": 10}));
        assert_eq!(
            safe_substitute("$column < ${limit}", &p),
            "amount < 10"
        );
    }

    #[test]
    fn test_unknown_placeholders_are_left_intact() {
        let p = params(json!({"pattern": "^[0-9]+$"}));
        assert_eq!(
            safe_substitute("$column ~ '$pattern' AND ${other}", &p),
            "$column ~ '^[0-9]+$' AND ${other}"
        );
    }

    #[test]
    fn test_escaped_dollar() {
        assert_eq!(safe_substitute("cost $$5", &Map::new()), "cost $5");
    }
}
