//! Answer extraction from question pages.
//!
//! The first answer block on the page is located and an ordered list of
//! [`AnswerRule`]s is applied to it. The first rule that yields non-empty
//! text wins; a page without any answer block yields an empty string.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, SearchError};

/// Selector for an answer block.
const ANSWER_SELECTOR: &str = ".answer";

/// Selector for the prose body inside an answer block, old and new markup.
const BODY_SELECTOR: &str = ".post-text, .s-prose, .js-post-body";

/// One way of pulling answer text out of an answer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRule {
    /// The first preformatted code block (`<pre><code>` or bare `<pre>`), verbatim.
    PreformattedCode,
    /// The first inline `<code>` element, verbatim.
    InlineCode,
    /// The whitespace-normalised prose body of the block.
    BodyText,
}

impl AnswerRule {
    /// Rules in priority order.
    pub const PRIORITY: [AnswerRule; 3] = [
        AnswerRule::PreformattedCode,
        AnswerRule::InlineCode,
        AnswerRule::BodyText,
    ];

    /// Apply this rule to an answer block. Returns `None` when nothing
    /// matched or the match contains only whitespace.
    pub fn apply(&self, block: ElementRef<'_>) -> Option<String> {
        let text = match self {
            Self::PreformattedCode => first_preformatted(block),
            Self::InlineCode => first_text(block, "code"),
            Self::BodyText => {
                let raw = first_text(block, BODY_SELECTOR)
                    .unwrap_or_else(|| block.text().collect::<String>());
                Some(normalise_whitespace(&raw))
            }
        }?;
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Extract the answer text from a question page.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the built-in selectors fail to compile.
pub fn extract_answer(html: &str) -> Result<String> {
    extract_answer_with_rules(html, &AnswerRule::PRIORITY)
}

/// Same as [`extract_answer`] with a caller-chosen rule order.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the answer selector fails to compile.
pub fn extract_answer_with_rules(html: &str, rules: &[AnswerRule]) -> Result<String> {
    let document = Html::parse_document(html);
    let answer_sel = Selector::parse(ANSWER_SELECTOR)
        .map_err(|e| SearchError::Parse(format!("invalid answer selector: {e:?}")))?;

    let Some(block) = document.select(&answer_sel).next() else {
        tracing::debug!("no answer block found");
        return Ok(String::new());
    };

    for rule in rules {
        if let Some(text) = rule.apply(block) {
            tracing::debug!(?rule, chars = text.len(), "answer extracted");
            return Ok(text);
        }
    }
    Ok(String::new())
}

/// Text of the first descendant matching `selector`.
fn first_text(block: ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    block
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

/// Text of the first `<pre>`, preferring its own `<code>` child.
fn first_preformatted(block: ElementRef<'_>) -> Option<String> {
    let pre_sel = Selector::parse("pre").ok()?;
    let code_sel = Selector::parse("code").ok()?;
    let pre = block.select(&pre_sel).next()?;
    let code = pre.select(&code_sel).next().unwrap_or(pre);
    Some(code.text().collect())
}

/// Collapse excess whitespace: multiple spaces become one, 3+ newlines become 2.
fn normalise_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count: u32 = 0;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            newline_count += 1;
            prev_was_space = false;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else if ch.is_whitespace() {
            newline_count = 0;
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            newline_count = 0;
            prev_was_space = false;
            result.push(ch);
        }
    }

    result
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
