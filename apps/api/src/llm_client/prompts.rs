// Shared prompt plumbing: the fixed system message, `$name` template
// rendering, and the two-message layout every generation call uses.
// Plugin-specific templates live next to the plugin that owns them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::Message;

/// System message sent ahead of every recommendation prompt.
pub const RESUME_ASSISTANT_SYSTEM: &str =
    "You are a CV/resume assistant. **Always returns in JSON format**";

/// Placeholder values keyed by name. Ordered so rendering never depends on hashing.
pub type TemplateFields = BTreeMap<String, String>;

/// Flattens a request into template fields.
///
/// Strings are used verbatim, other scalars through their JSON text, and
/// `null` becomes an empty string so an absent optional never reaches the
/// model as a raw placeholder.
pub fn template_fields<T: Serialize>(request: &T) -> Result<TemplateFields, serde_json::Error> {
    let mut fields = TemplateFields::new();
    if let Value::Object(map) = serde_json::to_value(request)? {
        for (key, value) in map {
            match value {
                Value::Null => {
                    fields.insert(key, String::new());
                }
                Value::String(s) => {
                    fields.insert(key, s);
                }
                other => {
                    fields.insert(key, other.to_string());
                }
            }
        }
    }
    Ok(fields)
}

fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

/// Substitutes `$name` and `${name}` placeholders from `fields`.
///
/// Never fails: placeholders with no matching field are left as written,
/// `$$` collapses to `$`, and fields the template never mentions are ignored.
pub fn render_template(template: &str, fields: &TemplateFields) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        let (name, consumed) = match after.strip_prefix('{') {
            Some(inner) => match inner.find('}') {
                Some(close) if close > 0 && identifier_len(inner) == close => {
                    (&inner[..close], close + 2)
                }
                _ => ("", 0),
            },
            None => {
                let len = identifier_len(after);
                (&after[..len], len)
            }
        };

        match fields.get(name) {
            Some(value) if !name.is_empty() => {
                out.push_str(value);
                rest = &after[consumed..];
            }
            _ => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Builds the `[system, user]` pair for a template and its fields.
pub fn build_messages(template: &str, fields: &TemplateFields) -> Vec<Message> {
    vec![
        Message::system(RESUME_ASSISTANT_SYSTEM),
        Message::user(render_template(template, fields)),
    ]
}
