use crate::origin::Origin;
use std::fmt::Write as _;

const WIDGET_TEMPLATE: &str = include_str!("../assets/widget.js");
const MISSING_CODE_SCRIPT: &str = include_str!("../assets/missing-code.js");

const USER_ID_PLACEHOLDER: &str = "__TRAKOSHIP_USER_ID__";
const BASE_URL_PLACEHOLDER: &str = "__TRAKOSHIP_BASE_URL__";

/// A single request for the widget bootstrap script.
#[derive(Debug, Clone)]
pub struct WidgetRequest {
    pub code: String,
    pub origin: Origin,
}

impl WidgetRequest {
    pub fn new(code: impl Into<String>, origin: Origin) -> Self {
        Self {
            code: code.into(),
            origin,
        }
    }

    /// Renders the bootstrap script with `code` and `origin` baked in as string literals.
    pub fn render(&self) -> String {
        render_template(
            WIDGET_TEMPLATE,
            &[
                (USER_ID_PLACEHOLDER, js_string_literal(&self.code)),
                (BASE_URL_PLACEHOLDER, js_string_literal(&self.origin.to_string())),
            ],
        )
    }
}

/// Script served when the embed URL has no `code` parameter.
pub fn missing_code_script() -> String {
    MISSING_CODE_SCRIPT.to_string()
}

/// Quotes `value` as a single-quoted JavaScript string literal.
///
/// Quotes and backslashes are backslash-prefixed; line terminators, other
/// control characters and `</` are escaped so the literal can neither end early
/// nor close a surrounding `<script>` element.
pub fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    let mut prev = None;
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '/' if prev == Some('<') => out.push_str("\\/"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
        prev = Some(ch);
    }
    out.push('\'');
    out
}

// Single pass, so substituted values are never scanned for placeholders again.
fn render_template(template: &str, substitutions: &[(&str, String)]) -> String {
    let extra: usize = substitutions.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    loop {
        let next = substitutions
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|idx| (idx, *key, value)))
            .min_by_key(|(idx, _, _)| *idx);
        let Some((idx, key, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..idx]);
        out.push_str(value);
        rest = &rest[idx + key.len()..];
    }
}
