//! Content renderer
//!
//! Turns one log record into a feed item. Rendering is pure: media is
//! described, never fetched, and every piece of upstream text is escaped
//! before it reaches the HTML body.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};

use crate::domain::entities::{AccountKey, FeedItem, MessageKind, MessageRecord};
use crate::error::RenderError;

const ELLIPSIS: char = '…';

// Epoch values this large are milliseconds; seconds would be past year 5000
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

// RSS dates are RFC 2822, which only covers four-digit years
const MAX_YEAR: i32 = 9999;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Renders `MessageRecord`s into `FeedItem`s
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    title_max_chars: usize,
    log_offset: FixedOffset,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self {
            title_max_chars: 64,
            log_offset: FixedOffset::east_opt(8 * 3600).expect("+08:00 is a valid offset"),
        }
    }
}

impl ContentRenderer {
    pub fn new(title_max_chars: usize, log_offset: FixedOffset) -> Self {
        Self {
            title_max_chars: title_max_chars.max(1),
            log_offset,
        }
    }

    /// Render one record. Fails only when the record lacks what every item
    /// needs: an id, an account and a readable timestamp.
    pub fn render(&self, record: &MessageRecord) -> Result<FeedItem, RenderError> {
        if record.message_id.trim().is_empty() {
            return Err(RenderError::new(
                format!("seq {}", record.seq),
                "missing message id",
            ));
        }
        let account = record
            .account
            .as_ref()
            .ok_or_else(|| RenderError::new(&record.message_id, "missing account reference"))?;
        let raw_time = record
            .time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RenderError::new(&record.message_id, "missing timestamp"))?;
        let published_at = parse_timestamp(raw_time, self.log_offset).ok_or_else(|| {
            RenderError::new(
                &record.message_id,
                format!("unreadable timestamp {:?}", raw_time),
            )
        })?;
        if !(0..=MAX_YEAR).contains(&published_at.year()) {
            return Err(RenderError::new(
                &record.message_id,
                format!("timestamp {:?} is out of range", raw_time),
            ));
        }

        let (title_source, body, link) = match record.kind {
            MessageKind::Link => self.render_link(record),
            MessageKind::Text => (record.text.clone(), text_block(&record.text), None),
            MessageKind::Location => (record.text.clone(), render_location(record), None),
            ref kind if kind.is_media() => (record.text.clone(), render_media(record), None),
            _ => (record.text.clone(), render_fallback(record), None),
        };

        let title = truncate_title(&title_source, self.title_max_chars)
            .unwrap_or_else(|| placeholder_title(&record.kind));
        let body = if body.is_empty() {
            format!("<p>{}</p>", escape_html(&placeholder_title(&record.kind)))
        } else {
            body
        };

        Ok(FeedItem {
            guid: item_guid(account, &record.message_id),
            title,
            body,
            published_at,
            link,
            seq: record.seq,
        })
    }

    fn render_link(&self, record: &MessageRecord) -> (String, String, Option<String>) {
        let Some(attrs) = record.link_attributes() else {
            return (record.text.clone(), text_block(&record.text), None);
        };

        let url = attrs
            .url
            .as_deref()
            .and_then(safe_url)
            .map(canonical_article_url);
        let title = attrs
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| record.text.clone());
        let description = attrs
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_default();

        let mut body = String::new();
        if let Some(image) = attrs.image.as_deref().and_then(safe_url) {
            if image.contains("telegra.ph") {
                // Telegraph previews are article pages, not images
                body.push_str(&format!(
                    "<a href=\"{}\">[Telegraph]</a><br/>",
                    escape_html(image)
                ));
            } else {
                body.push_str(&format!("<img src=\"{}\" /><br/>", escape_html(image)));
            }
        }
        body.push_str(&text_block(&description));
        if let Some(url) = &url {
            let label = if title.trim().is_empty() { url.as_str() } else { title.as_str() };
            body.push_str(&format!(
                "<p><a href=\"{}\">{}</a></p>",
                escape_html(url),
                escape_html(label)
            ));
        }

        (title, body, url)
    }
}

/// `urn:wechat-mp:<account>:<hex>`, stable for a given log row
pub fn item_guid(account: &AccountKey, message_id: &str) -> String {
    let digest = Sha256::digest(message_id.as_bytes());
    format!("urn:wechat-mp:{}:{}", account, hex::encode(&digest[..16]))
}

/// Escape text for inclusion in HTML or XML.
///
/// Code points XML 1.0 does not allow (C0 controls other than tab, LF and CR,
/// U+FFFE and U+FFFF) are dropped.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if !is_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Log timestamps come as `str(datetime)`, optionally with an offset
pub fn parse_timestamp(raw: &str, default_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return default_offset.from_local_datetime(&naive).single();
        }
    }
    let epoch = raw.parse::<i64>().ok()?;
    let utc = if epoch.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD as u64 {
        DateTime::<Utc>::from_timestamp_millis(epoch)
    } else {
        DateTime::<Utc>::from_timestamp(epoch, 0)
    };
    utc.map(|utc| utc.with_timezone(&default_offset))
}

/// First non-empty line, whitespace collapsed, cut at `max_chars`
fn truncate_title(source: &str, max_chars: usize) -> Option<String> {
    let line = source
        .lines()
        .map(|line| {
            let visible: String = line.chars().filter(|&c| is_xml_char(c)).collect();
            visible.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .find(|line| !line.is_empty())?;

    if line.chars().count() <= max_chars {
        return Some(line);
    }
    let mut title: String = line.chars().take(max_chars).collect();
    title.push(ELLIPSIS);
    Some(title)
}

fn placeholder_title(kind: &MessageKind) -> String {
    match kind {
        MessageKind::Text => "Untitled".to_string(),
        other => format!("[{}]", other.label()),
    }
}

/// Escaped paragraph with line breaks preserved. Leading and trailing blank
/// lines are dropped; spaces inside a line are kept as sent.
fn text_block(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let text = text.trim_matches(|c| c == '\n' || c == '\r');
    let lines: Vec<String> = text.lines().map(escape_html).collect();
    format!("<p>{}</p>", lines.join("<br/>"))
}

fn render_media(record: &MessageRecord) -> String {
    let mime = record
        .media
        .as_ref()
        .and_then(|m| m.mime.as_deref().or(m.media_type.as_deref()))
        .filter(|m| !m.is_empty());
    let placeholder = match mime {
        Some(mime) => format!("[{}: {}]", record.kind.label(), mime),
        None => format!("[{}]", record.kind.label()),
    };
    format!("<p>{}</p>{}", escape_html(&placeholder), text_block(&record.text))
}

fn render_location(record: &MessageRecord) -> String {
    let coordinate = |name: &str| {
        record
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .and_then(|value| value.as_f64())
    };
    let placeholder = match (coordinate("latitude"), coordinate("longitude")) {
        (Some(lat), Some(lon)) => format!("[Location: {:.6}, {:.6}]", lat, lon),
        _ => "[Location]".to_string(),
    };
    format!("<p>{}</p>{}", escape_html(&placeholder), text_block(&record.text))
}

fn render_fallback(record: &MessageRecord) -> String {
    let placeholder = format!("[{} message]", record.kind.label());
    format!("<p>{}</p>{}", escape_html(&placeholder), text_block(&record.text))
}

/// Only http(s) URLs make it into markup
fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

/// WeChat serves articles over https; the bridge often records http links
fn canonical_article_url(url: &str) -> String {
    match url.strip_prefix("http://mp.weixin.qq.com") {
        Some(rest) => format!("https://mp.weixin.qq.com{}", rest),
        None => url.to_string(),
    }
}
