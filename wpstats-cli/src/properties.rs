//! Command-line property parsing (`-p key=value`)

use wpstats::PropertyValue;

/// Parse `key=value`, inferring the value's type
///
/// `true`/`false` become booleans, integers and finite floats become numbers,
/// anything else is kept as text. Only the first `=` separates key from value.
pub fn parse_property(s: &str) -> Result<(String, PropertyValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property key in '{}'", s));
    }

    Ok((key.to_string(), infer_value(value)))
}

fn infer_value(raw: &str) -> PropertyValue {
    match raw {
        "true" => return PropertyValue::Bool(true),
        "false" => return PropertyValue::Bool(false),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return PropertyValue::Int(i);
    }

    match raw.parse::<f64>() {
        Ok(x) if x.is_finite() => PropertyValue::Float(x),
        _ => PropertyValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_inference() {
        assert_eq!(parse_property("draft=true").unwrap().1, PropertyValue::Bool(true));
        assert_eq!(parse_property("blog_id=42").unwrap().1, PropertyValue::Int(42));
        assert_eq!(parse_property("ratio=0.25").unwrap().1, PropertyValue::Float(0.25));
        assert_eq!(
            parse_property("source=reader").unwrap().1,
            PropertyValue::Text("reader".to_string())
        );
        // Non-finite floats stay text
        assert_eq!(
            parse_property("x=inf").unwrap().1,
            PropertyValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_split_on_first_equals() {
        let (key, value) = parse_property("query=a=b").unwrap();
        assert_eq!(key, "query");
        assert_eq!(value, PropertyValue::Text("a=b".to_string()));

        let (_, value) = parse_property("empty=").unwrap();
        assert_eq!(value, PropertyValue::Text(String::new()));
    }

    #[test]
    fn test_invalid_properties() {
        assert!(parse_property("no_separator").is_err());
        assert!(parse_property("=value").is_err());
    }
}
