use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ColorToken;

/// Human authors of a render call and their display colors.
pub type AuthorColors = BTreeMap<String, ColorToken>;

// Runs over escaped text: a raw `&` only appears as `&amp;`, so `&lt;`/`&gt;` end the URL.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bhttps?://(?:[-\w@:%.+~#=/?,!*()]|&amp;){2,}\b").expect("valid regex")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("valid regex")
});

/// Escapes text for HTML. `&` goes first so the entities added afterwards stay intact.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Applies `transform` to the parts of `text` that lie outside markup tags.
///
/// A tag runs from a `<` to the `>` that brings the nesting depth back to zero.
/// An unterminated tag is treated as plain text.
pub fn map_outside_tags<F>(text: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        output.push_str(&transform(&rest[..open]));
        let tail = &rest[open..];

        let mut depth = 0_usize;
        let mut close = None;
        for (idx, ch) in tail.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(idx);
                        break;
                    }
                }
                _ => {}
            }
        }

        match close {
            Some(idx) => {
                output.push_str(&tail[..=idx]);
                rest = &tail[idx + 1..];
            }
            None => {
                output.push_str(&transform(tail));
                return output;
            }
        }
    }

    output.push_str(&transform(rest));
    output
}

/// Wraps bare `http://` and `https://` URLs in links.
pub fn linkify(text: &str) -> String {
    map_outside_tags(text, |segment| {
        URL_RE
            .replace_all(segment, r#"<a href="${0}">${0}</a>"#)
            .into_owned()
    })
}

/// Link and mention decoration for message bodies, built once per author table.
#[derive(Debug, Clone)]
pub struct TextEnhancer {
    /// Escaped names with their CSS class, longest first.
    names: Vec<(String, String)>,
}

impl TextEnhancer {
    pub fn new(authors: &AuthorColors) -> Self {
        // Bodies are matched after escaping, so names are escaped the same way.
        let mut names = authors
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, color)| (escape_html(name), color.css_class()))
            .collect::<Vec<_>>();
        // Longest first so a nick never loses to a shorter nick it starts with.
        names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { names }
    }

    /// Linkifies URLs, then highlights author names, leaving existing tags untouched.
    pub fn enhance(&self, text: &str) -> String {
        let linked = linkify(text);
        if self.names.is_empty() {
            return linked;
        }
        map_outside_tags(&linked, |segment| self.highlight(segment))
    }

    fn highlight(&self, segment: &str) -> String {
        let entities = ENTITY_RE
            .find_iter(segment)
            .map(|m| m.range())
            .collect::<Vec<_>>();

        let mut output = String::with_capacity(segment.len());
        let mut copied = 0;
        let mut idx = 0;
        while idx < segment.len() {
            if let Some((name, class)) = self.mention_at(segment, idx, &entities) {
                output.push_str(&segment[copied..idx]);
                let _ = write!(output, r#"<span class="{class}">{name}</span>"#);
                idx += name.len();
                copied = idx;
                continue;
            }
            idx += segment[idx..].chars().next().map_or(1, char::len_utf8);
        }
        output.push_str(&segment[copied..]);
        output
    }

    fn mention_at(
        &self,
        segment: &str,
        idx: usize,
        entities: &[Range<usize>],
    ) -> Option<&(String, String)> {
        if is_word_char(segment[..idx].chars().next_back()) || splits_entity(entities, idx) {
            return None;
        }
        let rest = &segment[idx..];
        self.names.iter().find(|(name, _)| {
            let end = idx + name.len();
            rest.starts_with(name.as_str())
                && !is_word_char(segment[end..].chars().next())
                && !splits_entity(entities, end)
        })
    }
}

/// Mentions are whole nicks: they may not touch a letter, digit or `_`.
fn is_word_char(ch: Option<char>) -> bool {
    ch.is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
}

fn splits_entity(entities: &[Range<usize>], idx: usize) -> bool {
    entities.iter().any(|entity| entity.start < idx && idx < entity.end)
}

/// One-shot form of [`TextEnhancer::enhance`].
pub fn enhance(text: &str, authors: &AuthorColors) -> String {
    TextEnhancer::new(authors).enhance(text)
}

#[cfg(test)]
mod tests {
    use crate::enhance::{AuthorColors, enhance, escape_html, linkify, map_outside_tags};
    use crate::model::ColorToken;

    fn authors(entries: &[(&str, &str)]) -> AuthorColors {
        entries
            .iter()
            .map(|(name, color)| ((*name).to_string(), ColorToken::new(*color)))
            .collect()
    }

    #[test]
    fn escape_orders_ampersand_first() {
        assert_eq!(escape_html("<b>&1</b>"), "&lt;b&gt;&amp;1&lt;/b&gt;");
    }

    #[test]
    fn shielding_skips_tags() {
        let out = map_outside_tags(r#"ab<x class="ab">ab</x>ab"#, |s| s.to_uppercase());
        assert_eq!(out, r#"AB<x class="ab">AB</x>AB"#);
    }

    #[test]
    fn shielding_tracks_nested_brackets() {
        let out = map_outside_tags("a<b<c>d>e", |s| s.to_uppercase());
        assert_eq!(out, "A<b<c>d>E");
    }

    #[test]
    fn unterminated_tag_is_plain_text() {
        let out = map_outside_tags("a<b c", |s| s.to_uppercase());
        assert_eq!(out, "A<B C");
    }

    #[test]
    fn linkify_wraps_urls() {
        assert_eq!(
            linkify("see https://example.org/a?b=1&amp;c=2 now"),
            r#"see <a href="https://example.org/a?b=1&amp;c=2">https://example.org/a?b=1&amp;c=2</a> now"#
        );
    }

    #[test]
    fn linkify_stops_at_escaped_angle_brackets() {
        assert_eq!(
            linkify(&escape_html("<http://example.org>")),
            r#"&lt;<a href="http://example.org">http://example.org</a>&gt;"#
        );
    }

    #[test]
    fn linkify_requires_two_characters() {
        assert_eq!(linkify("http://x"), "http://x");
    }

    #[test]
    fn enhance_leaves_existing_anchor_alone() {
        let table = authors(&[("alice", "cyan")]);
        let out = enhance(r#"see <a href="http://x">http://x</a> alice"#, &table);
        assert_eq!(
            out,
            r#"see <a href="http://x">http://x</a> <span class="color-cyan">alice</span>"#
        );
    }

    #[test]
    fn mention_in_link_text_keeps_href_intact() {
        let table = authors(&[("alice", "cyan")]);
        let out = enhance("https://alice.example.org alice", &table);
        assert_eq!(
            out,
            r#"<a href="https://alice.example.org">https://<span class="color-cyan">alice</span>.example.org</a> <span class="color-cyan">alice</span>"#
        );
    }

    #[test]
    fn mentions_match_whole_words_only() {
        let table = authors(&[("al", "red"), ("alice", "cyan")]);
        let out = enhance("alice, al and alfred", &table);
        assert_eq!(
            out,
            r#"<span class="color-cyan">alice</span>, <span class="color-red">al</span> and alfred"#
        );
    }

    #[test]
    fn nicks_spelled_like_entities_leave_entities_intact() {
        let table = authors(&[("lt", "red"), ("amp", "cyan")]);
        let out = enhance(&escape_html("a < b & lt"), &table);
        assert_eq!(out, r#"a &lt; b &amp; <span class="color-red">lt</span>"#);
    }

    #[test]
    fn nicks_with_symbol_edges_are_highlighted() {
        let table = authors(&[("bob^", "cyan"), ("[m]bot", "red")]);
        let out = enhance("hi bob^ and [m]bot! bob^s", &table);
        assert_eq!(
            out,
            r#"hi <span class="color-cyan">bob^</span> and <span class="color-red">[m]bot</span>! bob^s"#
        );
    }

    #[test]
    fn mention_between_escaped_brackets_is_highlighted() {
        let table = authors(&[("alice", "cyan")]);
        let out = enhance(&escape_html("<alice>"), &table);
        assert_eq!(out, r#"&lt;<span class="color-cyan">alice</span>&gt;"#);
    }

    #[test]
    fn author_named_like_markup_does_not_break_tags() {
        let table = authors(&[("span", "red"), ("bob", "cyan")]);
        let out = enhance("bob span", &table);
        assert_eq!(
            out,
            r#"<span class="color-cyan">bob</span> <span class="color-red">span</span>"#
        );
    }
}
