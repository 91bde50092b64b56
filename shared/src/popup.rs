use std::fmt::Write;

use serde_json::{Map, Value};

/// Build the popup fragment for a feature's properties, one bold-labeled
/// line per key in document order. Returns `None` when the feature has no
/// property mapping, in which case no popup is bound. An empty mapping
/// still binds an (empty) popup.
pub fn popup_html(properties: Option<&Map<String, Value>>) -> Option<String> {
    let properties = properties?;
    let mut html = String::from("<div style='font-size:14px'>");
    for (key, value) in properties {
        let _ = write!(html, "<b>{key}:</b> {}<br>", display_value(value));
    }
    html.push_str("</div>");
    Some(html)
}

/// Render a JSON value the way a browser stringifies it in a template literal.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) if i.unsigned_abs() <= MAX_SAFE_INTEGER => i.to_string(),
            (_, Some(u)) if u <= MAX_SAFE_INTEGER => u.to_string(),
            _ => format_number(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Integers above this lose precision once read as a JS number.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// `Number.prototype.toString`: plain decimal in `[1e-6, 1e21)`,
/// exponent form with an explicit sign otherwise.
fn format_number(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{f}");
    }
    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn one_bold_line_per_property_in_document_order() {
        let p = props(json!({ "zeta": "a", "alpha": 2, "mid": true }));
        let html = popup_html(Some(&p)).unwrap();
        assert_eq!(
            html,
            "<div style='font-size:14px'><b>zeta:</b> a<br><b>alpha:</b> 2<br><b>mid:</b> true<br></div>"
        );
        assert_eq!(html.matches("<b>").count(), 3);
        assert_eq!(html.matches("<br>").count(), 3);
    }

    #[test]
    fn only_missing_properties_bind_no_popup() {
        assert_eq!(popup_html(None), None);
        assert_eq!(
            popup_html(Some(&Map::new())).as_deref(),
            Some("<div style='font-size:14px'></div>")
        );
    }

    #[test]
    fn values_are_stringified_like_a_browser() {
        assert_eq!(display_value(&json!(1.0)), "1");
        assert_eq!(display_value(&json!(0.25)), "0.25");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&Value::Null), "null");
        assert_eq!(display_value(&json!([1, "b", null])), "1,b,");
        assert_eq!(display_value(&json!({ "k": 1 })), "[object Object]");
    }

    #[test]
    fn numbers_outside_plain_range_use_exponent_form() {
        assert_eq!(display_value(&json!(4e-7)), "4e-7");
        assert_eq!(display_value(&json!(0.000001)), "0.000001");
        assert_eq!(display_value(&json!(1.25e-8)), "1.25e-8");
        assert_eq!(display_value(&json!(1e21)), "1e+21");
        assert_eq!(display_value(&json!(1.5e300)), "1.5e+300");
        assert_eq!(display_value(&json!(-2e22)), "-2e+22");
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(-0.0)), "0");
    }

    #[test]
    fn integers_beyond_double_precision_round_like_a_browser() {
        assert_eq!(display_value(&json!(9007199254740991u64)), "9007199254740991");
        assert_eq!(display_value(&json!(u64::MAX)), "18446744073709552000");
        assert_eq!(display_value(&json!(9007199254740993i64)), "9007199254740992");
    }

    #[test]
    fn strings_are_inserted_verbatim() {
        let p = props(json!({ "name": "<i>Sava</i>" }));
        let html = popup_html(Some(&p)).unwrap();
        assert!(html.contains("<b>name:</b> <i>Sava</i><br>"));
    }
}
