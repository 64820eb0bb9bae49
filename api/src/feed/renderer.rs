//! Feed renderer
//!
//! Writes feed documents as RSS 2.0 and account lists as OPML 2.0. Item
//! bodies are already HTML; they are escaped once more so readers get the
//! markup back after XML decoding.

use chrono::Utc;

use crate::app::escape_html;
use crate::domain::entities::{AccountIdentity, FeedDocument, FeedItem};

const OPML_TITLE: &str = "WeChat MP RSS Feeds";

const MP_HOME: &str = "https://mp.weixin.qq.com";

/// Render a feed document to RSS 2.0.
///
/// `feed_url` is the public URL of this feed; it becomes the channel link and
/// the `atom:link` self reference.
pub fn render_rss(feed: &FeedDocument, feed_url: Option<&str>) -> String {
    let account = &feed.account;
    let mut buf = String::new();

    buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buf.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    buf.push_str("<channel>\n");

    let link = feed_url.unwrap_or(MP_HOME);
    let description = if account.signature.trim().is_empty() {
        format!("{} - WeChat Public Account", account.name)
    } else {
        account.signature.clone()
    };

    push_element(&mut buf, 1, "title", &account.name);
    push_element(&mut buf, 1, "link", link);
    push_element(&mut buf, 1, "description", &description);
    push_element(&mut buf, 1, "language", "zh-CN");
    push_element(
        &mut buf,
        1,
        "lastBuildDate",
        &feed.generated_at.to_rfc2822(),
    );
    if let Some(url) = feed_url {
        buf.push_str(&format!(
            "  <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
            escape_html(url)
        ));
    }

    if let Some(avatar) = &account.avatar_url {
        buf.push_str("  <image>\n");
        push_element(&mut buf, 2, "url", avatar);
        push_element(&mut buf, 2, "title", &account.name);
        push_element(&mut buf, 2, "link", link);
        buf.push_str("  </image>\n");
    }

    for item in &feed.items {
        buf.push_str(&render_item(item));
    }

    buf.push_str("</channel>\n");
    buf.push_str("</rss>\n");
    buf
}

fn render_item(item: &FeedItem) -> String {
    let mut buf = String::from("  <item>\n");

    push_element(&mut buf, 2, "title", &item.title);
    if let Some(link) = &item.link {
        push_element(&mut buf, 2, "link", link);
    }
    push_element(&mut buf, 2, "description", &item.body);
    buf.push_str(&format!(
        "    <guid isPermaLink=\"false\">{}</guid>\n",
        escape_html(&item.guid)
    ));
    push_element(&mut buf, 2, "pubDate", &item.published_at.to_rfc2822());

    buf.push_str("  </item>\n");
    buf
}

/// Render an OPML 2.0 subscription list pointing at this server's feeds
pub fn render_opml(accounts: &[AccountIdentity], base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let mut buf = String::new();

    buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buf.push_str("<opml version=\"2.0\">\n");
    buf.push_str("<head>\n");
    push_element(&mut buf, 1, "title", OPML_TITLE);
    push_element(&mut buf, 1, "dateCreated", &Utc::now().to_rfc2822());
    buf.push_str("</head>\n");
    buf.push_str("<body>\n");

    for account in accounts {
        let xml_url = format!(
            "{}/api/rss/{}",
            base_url,
            urlencoding::encode(account.key.as_str())
        );
        buf.push_str(&format!(
            "  <outline type=\"rss\" text=\"{name}\" title=\"{name}\" description=\"{description}\" xmlUrl=\"{xml_url}\" htmlUrl=\"{html_url}\"/>\n",
            name = escape_html(&account.name),
            description = escape_html(&account.signature),
            xml_url = escape_html(&xml_url),
            html_url = MP_HOME,
        ));
    }

    buf.push_str("</body>\n");
    buf.push_str("</opml>\n");
    buf
}

fn push_element(buf: &mut String, depth: usize, name: &str, text: &str) {
    for _ in 0..depth {
        buf.push_str("  ");
    }
    buf.push_str(&format!("<{name}>{}</{name}>\n", escape_html(text)));
}
