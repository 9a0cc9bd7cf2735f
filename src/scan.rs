use regex::Regex;
use std::sync::LazyLock;

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+])\s+(.+)$").unwrap());
static RE_FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,})(.*)$").unwrap());
static RE_CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// One typed document token, in strict document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    HeadingOpen { level: usize },
    HeadingClose { level: usize },
    BulletListOpen,
    BulletListClose,
    ListItemOpen,
    ListItemClose,
    InlineText(String),
    CodeSpan(String),
    Fence { info: String, content: String },
}

struct ListLevel {
    indent: usize,
}

struct Scanner {
    tokens: Vec<Token>,
    lists: Vec<ListLevel>,
    fence: Option<(String, String, Vec<String>)>,
}

impl Scanner {
    fn new() -> Self {
        Scanner {
            tokens: Vec::new(),
            lists: Vec::new(),
            fence: None,
        }
    }

    /// Split inline content into text and code-span tokens.
    fn push_inline(&mut self, text: &str) {
        let mut last_end = 0;
        for caps in RE_CODE_SPAN.captures_iter(text) {
            let (Some(whole), Some(span)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let before = &text[last_end..whole.start()];
            if !before.trim().is_empty() {
                self.tokens.push(Token::InlineText(before.to_string()));
            }
            self.tokens.push(Token::CodeSpan(span.as_str().to_string()));
            last_end = whole.end();
        }
        let tail = &text[last_end..];
        if !tail.trim().is_empty() {
            self.tokens.push(Token::InlineText(tail.to_string()));
        }
    }

    fn close_one_list(&mut self) {
        self.lists.pop();
        self.tokens.push(Token::ListItemClose);
        self.tokens.push(Token::BulletListClose);
    }

    fn close_all_lists(&mut self) {
        while !self.lists.is_empty() {
            self.close_one_list();
        }
    }

    fn open_list(&mut self, indent: usize, text: &str) {
        self.lists.push(ListLevel { indent });
        self.tokens.push(Token::BulletListOpen);
        self.tokens.push(Token::ListItemOpen);
        self.push_inline(text);
    }

    fn bullet_line(&mut self, indent: usize, text: &str) {
        while self.lists.last().is_some_and(|top| top.indent > indent) {
            self.close_one_list();
        }
        if self.lists.last().is_some_and(|top| top.indent == indent) {
            // Sibling item at the same level.
            self.tokens.push(Token::ListItemClose);
            self.tokens.push(Token::ListItemOpen);
            self.push_inline(text);
        } else {
            self.open_list(indent, text);
        }
    }

    fn feed_line(&mut self, line: &str) {
        if self.fence.is_some() {
            let closes = matches!(&self.fence, Some((marker, _, _)) if is_fence_close(line, marker));
            if closes {
                if let Some((_, info, buf)) = self.fence.take() {
                    self.tokens.push(Token::Fence {
                        info,
                        content: buf.join("\n"),
                    });
                }
            } else if let Some((_, _, buf)) = &mut self.fence {
                buf.push(line.to_string());
            }
            return;
        }
        if let Some(caps) = RE_FENCE_OPEN.captures(line) {
            self.close_all_lists();
            self.fence = Some((caps[1].to_string(), caps[2].trim().to_string(), Vec::new()));
            return;
        }
        if let Some(caps) = RE_HEADING.captures(line) {
            self.close_all_lists();
            let level = caps[1].len();
            self.tokens.push(Token::HeadingOpen { level });
            self.tokens.push(Token::InlineText(caps[2].trim().to_string()));
            self.tokens.push(Token::HeadingClose { level });
            return;
        }
        if let Some(caps) = RE_BULLET.captures(line) {
            let indent = caps[1].len();
            self.bullet_line(indent, caps[3].trim_end());
            return;
        }
        if line.trim().is_empty() {
            // Blank lines do not terminate an open list.
            return;
        }
        self.close_all_lists();
        self.tokens.push(Token::InlineText(line.trim().to_string()));
    }

    fn finish(mut self) -> Vec<Token> {
        if let Some((_, info, buf)) = self.fence.take() {
            if !buf.is_empty() {
                self.tokens.push(Token::Fence {
                    info,
                    content: buf.join("\n"),
                });
            }
        }
        self.close_all_lists();
        self.tokens
    }
}

/// A closing fence is a backtick run at least as long as the opening marker.
fn is_fence_close(line: &str, marker: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= marker.len() && trimmed.chars().all(|c| c == '`')
}

/// Tokenize normalized document lines into the typed token stream consumed by
/// the document parser.
pub fn scan_lines(lines: &[String]) -> Vec<Token> {
    let mut scanner = Scanner::new();
    for line in lines {
        scanner.feed_line(line);
    }
    scanner.finish()
}
