//! Turns the backend's plain-text answers into a small, safe markup subset.
//!
//! Answers use two conventions: `**bold**` runs and `-`/`*` bullet lines.
//! [`parse`] reads them into a [`Fragment`] which can then be written out as
//! an HTML fragment ([`Fragment::to_html`]) or styled for the terminal.
//! Anything that does not match a rule is kept as literal text; an unmatched
//! `**` is not an error.

use std::sync::LazyLock;

use regex::Regex;

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[*-]\s+(.*)$").expect("bullet pattern is valid"));

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("strong pattern is valid"));

static BLOCK_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("block break pattern is valid"));

/// A run of text inside a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Strong(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Plain(s) | Inline::Strong(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Paragraph(Vec<Inline>),
    /// Consecutive bullet lines, one entry per item.
    List(Vec<Vec<Inline>>),
    /// A blank line in the source.
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

/// Split a line into plain and strong runs. Matching is non-greedy, so
/// `**a** and **b**` yields two strong runs.
pub fn parse_inline(line: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in STRONG.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Inline::Plain(line[last..whole.start()].to_string()));
        }
        out.push(Inline::Strong(inner.as_str().to_string()));
        last = whole.end();
    }

    if last < line.len() {
        out.push(Inline::Plain(line[last..].to_string()));
    }

    out
}

/// Read `content` line by line into a [`Fragment`].
pub fn parse(content: &str) -> Fragment {
    let mut nodes = Vec::new();
    let mut open_list: Option<Vec<Vec<Inline>>> = None;

    for line in content.split('\n') {
        if let Some(caps) = BULLET.captures(line) {
            let item = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            open_list.get_or_insert_with(Vec::new).push(parse_inline(item));
            continue;
        }

        if let Some(items) = open_list.take() {
            nodes.push(Node::List(items));
        }

        if line.trim().is_empty() {
            nodes.push(Node::Break);
        } else {
            nodes.push(Node::Paragraph(parse_inline(line)));
        }
    }

    if let Some(items) = open_list.take() {
        nodes.push(Node::List(items));
    }

    Fragment { nodes }
}

/// Escape the characters that would otherwise be read as markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_inline(out: &mut String, runs: &[Inline]) {
    for run in runs {
        match run {
            Inline::Plain(text) => out.push_str(&escape_html(text)),
            Inline::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(text));
                out.push_str("</strong>");
            }
        }
    }
}

impl Fragment {
    pub fn to_html(&self) -> String {
        let mut out = String::new();

        for node in &self.nodes {
            match node {
                Node::Paragraph(runs) => {
                    out.push_str("<p>");
                    write_inline(&mut out, runs);
                    out.push_str("</p>");
                }
                Node::List(items) => {
                    out.push_str("<ul>");
                    for item in items {
                        out.push_str("<li>");
                        write_inline(&mut out, item);
                        out.push_str("</li>");
                    }
                    out.push_str("</ul>");
                }
                Node::Break => out.push_str("<br />"),
            }
        }

        out
    }
}

/// Format an answer as an HTML fragment.
pub fn to_html(content: &str) -> String {
    parse(content).to_html()
}

/// Split an answer into display blocks on runs of two or more newlines.
/// Blocks are trimmed and empty ones dropped.
pub fn split_blocks(content: &str) -> Vec<&str> {
    BLOCK_BREAK
        .split(content)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
    }

    #[test]
    fn bold_round_trips() {
        let html = to_html("**bold**");
        assert_eq!(html, "<p><strong>bold</strong></p>");

        let inner = html
            .strip_prefix("<p><strong>")
            .and_then(|s| s.strip_suffix("</strong></p>"))
            .unwrap();
        assert_eq!(unescape(inner), "bold");
    }

    #[test]
    fn markup_is_escaped_before_bold() {
        assert_eq!(
            to_html("<script>alert(1)</script> & **a<b**"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; <strong>a&lt;b</strong></p>"
        );
    }

    #[test]
    fn consecutive_bullets_share_one_list() {
        let fragment = parse("- a\n- b");
        assert_eq!(
            fragment.nodes,
            vec![Node::List(vec![
                vec![Inline::Plain("a".to_string())],
                vec![Inline::Plain("b".to_string())],
            ])]
        );
        assert_eq!(fragment.to_html(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn list_closes_on_paragraph_and_blank_line() {
        let html = to_html("Intro\n* one\n  - two\n\nOutro");
        assert_eq!(
            html,
            "<p>Intro</p><ul><li>one</li><li>two</li></ul><br /><p>Outro</p>"
        );
    }

    #[test]
    fn list_interrupted_twice_makes_two_lists() {
        let fragment = parse("- a\ntext\n- b");
        let lists = fragment
            .nodes
            .iter()
            .filter(|n| matches!(n, Node::List(_)))
            .count();
        assert_eq!(lists, 2);
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(to_html("**not closed"), "<p>**not closed</p>");
        assert_eq!(to_html("-no space"), "<p>-no space</p>");
        assert_eq!(to_html("****"), "<p>****</p>");
    }

    #[test]
    fn strong_is_non_greedy() {
        assert_eq!(
            parse_inline("**a** and **b**"),
            vec![
                Inline::Strong("a".to_string()),
                Inline::Plain(" and ".to_string()),
                Inline::Strong("b".to_string()),
            ]
        );
    }

    #[test]
    fn bold_inside_bullets() {
        assert_eq!(
            to_html("- **Dose:** 3-5 g"),
            "<ul><li><strong>Dose:</strong> 3-5 g</li></ul>"
        );
    }

    #[test]
    fn whitespace_only_line_is_a_break() {
        assert_eq!(to_html("a\n   \nb"), "<p>a</p><br /><p>b</p>");
    }

    #[test]
    fn empty_content_is_one_break() {
        assert_eq!(to_html(""), "<br />");
    }

    #[test]
    fn blocks_split_on_blank_runs() {
        let content = "First part.\n\n\nSecond part\nstill second.\n\n  \n\nReferences:\n[1] Study 42";
        assert_eq!(
            split_blocks(content),
            vec![
                "First part.",
                "Second part\nstill second.",
                "References:\n[1] Study 42"
            ]
        );
        assert!(split_blocks("\n\n").is_empty());
    }
}
