/// Tolerant parsing of the title-extraction model reply.
///
/// The model is instructed to return a bare JSON array, but replies drift:
/// wrapper objects, surrounding prose, bullet lists. The fallback chain here
/// mirrors that reality. Parsing never fails; an unusable reply yields an
/// empty list, which downstream stages treat as "no titles mentioned".
use serde_json::Value;

/// Parses a model reply into a list of movie titles.
///
/// Chain, first success wins:
/// 1. reply is a bare JSON array
/// 2. reply is a JSON object carrying the array under `movies` or `titles`
/// 3. a bracketed array embedded in surrounding prose
/// 4. line-split with bullet/quote stripping, only when brackets were
///    present but would not parse
pub fn parse_title_reply(reply: &str) -> Vec<String> {
    let reply = reply.trim();

    let titles = if reply.starts_with('[') && reply.ends_with(']') {
        parse_json_titles(reply).unwrap_or_else(|| split_lines(reply))
    } else if let Ok(value) = serde_json::from_str::<Value>(reply) {
        titles_from_object(&value).unwrap_or_default()
    } else if let Some(slice) = bracketed_slice(reply) {
        parse_json_titles(slice).unwrap_or_else(|| split_lines(reply))
    } else {
        Vec::new()
    };

    titles
        .into_iter()
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

fn parse_json_titles(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let array = value.as_array()?;
    Some(
        array
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
    )
}

fn titles_from_object(value: &Value) -> Option<Vec<String>> {
    let inner = value.get("movies").or_else(|| value.get("titles"))?;
    match inner {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::to_string)
                .collect(),
        ),
        Value::String(single) => Some(vec![single.clone()]),
        _ => None,
    }
}

/// The substring from the first `[` through the last `]`, if both exist
fn bracketed_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            line.trim_start_matches(['-', '•', '*', ' '])
                .replace('"', "")
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}
