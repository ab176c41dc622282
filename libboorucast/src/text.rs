//! Text handling for relayed mentions.

use scraper::{Html, Selector};

/// Maximum status length on the target instance.
const POST_LEN: usize = 500;

/// Continuation marker appended to every part except the last.
const CONTINUATION: char = '…';

/// Extract the visible text of a rendered status: the text of each
/// paragraph, one line per paragraph.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let paragraphs = Selector::parse("p").expect("static selector");
    fragment
        .select(&paragraphs)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Defang handles in third-party text so relaying it cannot ping anyone.
pub fn sanitize_forwarded(text: &str) -> String {
    text.replace('@', "/")
}

/// Split `text` into posts of at most [`POST_LEN`] characters, each prefixed
/// with `prefix` on its own line. Every part except the last carries a
/// trailing ellipsis line. An empty `text` yields no parts.
pub fn split_into_posts(prefix: &str, text: &str) -> Vec<String> {
    let reserved = prefix.chars().count() + 3;
    if reserved >= POST_LEN {
        return Vec::new();
    }
    let part_len = POST_LEN - reserved;

    let chars: Vec<char> = text.chars().collect();
    let chunks: Vec<String> = chars
        .chunks(part_len)
        .map(|chunk| chunk.iter().collect())
        .collect();
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            if index + 1 == total {
                format!("{prefix}\n{chunk}")
            } else {
                format!("{prefix}\n{chunk}\n{CONTINUATION}")
            }
        })
        .collect()
}
