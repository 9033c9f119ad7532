use crate::domain::model::PageCursor;
use url::Url;

/// Reads the `next` relation from a `Link` header value and extracts its
/// `offset`/`limit` query parameters.
///
/// Pagination is best-effort: a missing header, a missing `next` relation or
/// any malformed piece yields `None`, which callers treat as the last page.
pub fn next_cursor(link: Option<&str>) -> Option<PageCursor> {
    let target = next_target(link?)?;
    cursor_from_target(target)
}

fn next_target(link: &str) -> Option<&str> {
    let mut rest = link;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>')?;
        let target = &after[..end];
        let tail = &after[end + 1..];

        // 參數延伸到下一個 link-value 為止
        let params = match tail.find('<') {
            Some(next) => &tail[..next],
            None => tail,
        };

        if has_next_relation(params) {
            return Some(target.trim());
        }
        rest = tail;
    }

    None
}

fn has_next_relation(params: &str) -> bool {
    params
        .split(|c: char| c == ';' || c == ',')
        .filter_map(|param| param.split_once('='))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("rel"))
        .any(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("next"))
        })
}

fn cursor_from_target(target: &str) -> Option<PageCursor> {
    // 部分平台回傳相對路徑
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => Url::parse("http://relative.invalid/").ok()?.join(target).ok()?,
    };

    let mut offset = None;
    let mut limit = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "offset" => offset = value.parse::<u64>().ok(),
            "limit" => limit = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    match (offset, limit) {
        (Some(offset), Some(limit)) if limit > 0 => Some(PageCursor { offset, limit }),
        _ => None,
    }
}
