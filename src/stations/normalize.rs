//! Maps loosely shaped upstream JSON into [`Station`] records.
//!
//! Content-API posts keep their fields at the top level, under `acf` or under
//! `meta`, and any of them may hold a string, an object such as
//! `{ "url": ... }` or `{ "rendered": ... }`, or an array of those. Nothing
//! here fails: missing data becomes an empty field and the batch filter
//! decides what survives.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::sanitize::{clean_location, derive_frequency};
use super::Station;

static URL_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+"#).expect("url in text pattern"));

const URL_SUBFIELDS: &[&str] = &["url", "source_url", "rendered", "value"];
const STREAM_URL_KEYS: &[&str] = &["streamUrl", "stream_url"];
const CUSTOM_FIELD_CONTAINERS: &[&str] = &["acf", "meta"];

fn field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    value.and_then(|value| value.get(key))
}

/// Plain text of a scalar field. Objects carry no text of their own.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        _ => String::new(),
    }
}

fn first_text<'a>(values: impl IntoIterator<Item = Option<&'a Value>>) -> String {
    values
        .into_iter()
        .map(text)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn first_present<'a>(values: impl IntoIterator<Item = Option<&'a Value>>) -> Option<&'a Value> {
    values.into_iter().flatten().find(|value| !value.is_null())
}

/// First non-empty URL-ish string, walking arrays in order and objects
/// through their well-known URL sub-fields.
fn extract_url(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| extract_url(Some(item)))
            .find(|url| !url.is_empty())
            .unwrap_or_default(),
        Some(object) if object.is_object() => URL_SUBFIELDS
            .iter()
            .map(|key| extract_url(object.get(*key)))
            .find(|url| !url.is_empty())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn find_url_in_text(value: Option<&Value>) -> String {
    let source = text(value);
    URL_IN_TEXT
        .find(&source)
        .map(|found| found.as_str().trim().to_string())
        .unwrap_or_default()
}

fn resolve_stream_url(raw: &Value) -> String {
    let raw = Some(raw);
    let structured = STREAM_URL_KEYS
        .iter()
        .map(|key| field(raw, key))
        .chain(CUSTOM_FIELD_CONTAINERS.iter().flat_map(|container| {
            STREAM_URL_KEYS
                .iter()
                .map(move |key| field(field(raw, container), key))
        }))
        .chain([field(raw, "url_resolved"), field(raw, "url")])
        .map(extract_url)
        .find(|url| !url.is_empty());

    // Last resort: the first link mentioned in the post body or excerpt.
    structured.unwrap_or_else(|| {
        ["content", "excerpt"]
            .iter()
            .map(|key| find_url_in_text(field(field(raw, key), "rendered")))
            .find(|url| !url.is_empty())
            .unwrap_or_default()
    })
}

/// Non-negative whole number from a numeric or numeric-string field.
fn count(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if number.is_finite() && number > 0.0 {
        number.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn is_truthy_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "1" || s.to_lowercase() == "true",
        _ => false,
    }
}

/// Content APIs use a numeric id of 0 for unsaved drafts.
fn is_zero(value: &Value) -> bool {
    value.as_f64() == Some(0.0)
}

/// Normalizes a content-API post or a directory record.
pub fn normalize_station(raw: &Value, default_country: &str) -> Station {
    let root = Some(raw);
    let acf = field(root, "acf");
    let meta = field(root, "meta");

    let name = first_text([
        field(root, "name"),
        field(field(root, "title"), "rendered"),
        field(root, "title"),
    ]);
    let stream_url = resolve_stream_url(raw);

    let country = first_text([field(root, "country"), field(acf, "country")]);
    let country = if country.is_empty() {
        default_country.to_string()
    } else {
        country
    };
    let city = clean_location(&first_text([
        field(root, "city"),
        field(acf, "city"),
        field(root, "state"),
    ]));
    let genre = first_text([
        field(root, "genre"),
        field(acf, "genre"),
        field(root, "tags"),
        field(acf, "tags"),
    ]);
    let language = first_text([
        field(root, "language"),
        field(acf, "language"),
        field(root, "languagecodes"),
    ]);
    let codec = first_text([field(root, "codec"), field(acf, "codec")]).to_uppercase();
    let bitrate = count(first_present([field(root, "bitrate"), field(acf, "bitrate")]));
    let votes = count(field(root, "votes"));

    // A post without a truthy flag in any container is inactive.
    let is_active = first_present([
        field(root, "is_active"),
        field(acf, "is_active"),
        field(meta, "is_active"),
    ])
    .is_some_and(is_truthy_flag);

    let id = first_text([
        field(root, "id").filter(|id| !is_zero(id)),
        field(root, "slug"),
        field(root, "stationuuid"),
        field(root, "changeuuid"),
    ]);
    let id = if id.is_empty() {
        composite_id(&name, &stream_url)
    } else {
        id
    };

    Station {
        id,
        frequency: derive_frequency(&name),
        name,
        city,
        country,
        genre,
        stream_url,
        language,
        codec,
        bitrate,
        votes,
        is_active,
    }
}

/// Normalizes a public radio-directory record for the offline backup.
pub fn normalize_directory_station(raw: &Value, default_country: &str) -> Station {
    let root = Some(raw);
    let name = text(field(root, "name"));
    let stream_url = first_text([field(root, "url_resolved"), field(root, "url")]);
    let id = first_text([field(root, "stationuuid"), field(root, "changeuuid")]);
    let id = if id.is_empty() {
        composite_id(&name, &stream_url)
    } else {
        id
    };
    let country = text(field(root, "country"));

    Station {
        id,
        frequency: derive_frequency(&name),
        city: text(field(root, "state")),
        country: if country.is_empty() {
            default_country.to_string()
        } else {
            country
        },
        genre: text(field(root, "tags")),
        language: first_text([field(root, "language"), field(root, "languagecodes")]),
        codec: text(field(root, "codec")).to_uppercase(),
        bitrate: count(field(root, "bitrate")),
        votes: count(field(root, "votes")),
        is_active: true,
        name,
        stream_url,
    }
}

fn composite_id(name: &str, stream_url: &str) -> String {
    format!("{}-{}", name.to_lowercase(), stream_url.to_lowercase())
}
