use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Static regex patterns for text cleaning (compiled once, reused many times)
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());
static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static RE_LEADING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ ]+").unwrap());
static RE_TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ ]+\n").unwrap());
static RE_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}\n").unwrap());
static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[image\]").unwrap());

const FIELD_PREFIXES: &[&str] = &[
    "System.",
    "Microsoft.VSTS.Common.",
    "Microsoft.VSTS.Scheduling.",
    "Microsoft.VSTS.CMMI.",
    "Microsoft.VSTS.TCM.",
];

const SKIPPED_FIELDS: &[&str] = &[
    "ActivatedBy",
    "ActivatedDate",
    "BoardColumnDone",
    "ClosedBy",
    "ClosedDate",
    "Column.Done",
    "CommentCount",
    "Reason",
    "ResolvedBy",
    "ResolvedDate",
    "Watermark",
    "AuthorizedAs",
    "AuthorizedDate",
    "RevisedDate",
    "PersonId",
];

const HTML_FIELDS: &[&str] = &["Acceptance", "Description", "Justification", "ReproSteps", "text"];

/// "Jane Doe <jane@contoso.com>" for identity objects, `None` for anything else.
fn identity_display(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    let name = obj.get("displayName")?.as_str()?;
    match obj.get("uniqueName").and_then(Value::as_str) {
        Some(unique_name) if !unique_name.is_empty() => {
            Some(format!("{} <{}>", name, unique_name))
        }
        _ => Some(name.to_string()),
    }
}

fn short_field_name(key: String) -> String {
    if let Some(short) = FIELD_PREFIXES.iter().find_map(|p| key.strip_prefix(p)) {
        return match short {
            "BoardColumn" => "Column".to_string(),
            "BoardLane" => "Lane".to_string(),
            "AcceptanceCriteria" => "Acceptance".to_string(),
            "TeamProject" => "Project".to_string(),
            "WorkItemType" => "Type".to_string(),
            "IterationPath" => "Iteration".to_string(),
            other => other.to_string(),
        };
    }
    if key.contains("_Kanban.Column") {
        // Dynamic WEF_..._Kanban.Column(.Done)
        if key.ends_with(".Done") {
            "Column.Done".to_string()
        } else {
            "Column".to_string()
        }
    } else if key.contains("_Kanban.Lane") {
        "Lane".to_string()
    } else {
        key
    }
}

/// Converts HTML to plain text and squeezes the whitespace html2text leaves behind.
pub(crate) fn html_to_text(html: &str) -> String {
    let Ok(mut plain_text) = html2text::from_read(html.as_bytes(), usize::MAX) else {
        return html.to_string();
    };

    plain_text = plain_text.replace('\r', "\n");
    plain_text = plain_text.replace('\t', " ");
    plain_text = plain_text.replace('─', "-");
    plain_text = RE_SPACES.replace_all(&plain_text, " ").to_string();
    plain_text = RE_NEWLINES.replace_all(&plain_text, "\n").to_string();
    plain_text = RE_LEADING_WS.replace_all(&plain_text, "\n").to_string();
    plain_text = RE_TRAILING_WS.replace_all(&plain_text, "\n").to_string();
    plain_text = RE_DASHES.replace_all(&plain_text, "---\n").to_string();
    plain_text = RE_IMAGE.replace_all(&plain_text, "").to_string();

    plain_text.trim().to_string()
}

fn simplify_field(key: &str, val: Value) -> Value {
    if let Some(display) = identity_display(&val) {
        return Value::String(display);
    }
    match (key, val) {
        (k, Value::String(html)) if HTML_FIELDS.contains(&k) => Value::String(html_to_text(&html)),
        ("Tags", Value::String(tags)) => Value::String(tags.replace("; ", ";")),
        (_, other) => other,
    }
}

/// Recursively simplifies work item JSON to reduce token usage for LLMs.
///
/// Drops link noise (`url`, `_links`, avatars), flattens `fields` onto the
/// item with short names, flattens identities and converts HTML to text.
pub fn simplify_work_item_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("url");
            map.remove("_links");
            map.remove("descriptor");
            map.remove("imageUrl");
            map.remove("avatar");

            if let Some(Value::Object(fields_map)) = map.remove("fields") {
                for (key, val) in fields_map {
                    let final_key = short_field_name(key);
                    if SKIPPED_FIELDS.contains(&final_key.as_str()) || map.contains_key(&final_key)
                    {
                        continue;
                    }
                    let val = simplify_field(&final_key, val);
                    map.insert(final_key, val);
                }
            }

            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                if let Some(v) = map.get_mut(&key) {
                    if let Some(display) = identity_display(v) {
                        *v = Value::String(display);
                    } else if key == "text"
                        && let Value::String(html) = v
                    {
                        *v = Value::String(html_to_text(html));
                    } else {
                        simplify_work_item_json(v);
                    }
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                simplify_work_item_json(item);
            }
        }
        _ => {}
    }
}
