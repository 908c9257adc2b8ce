//! Reading-time estimation.
//!
//! Markdown is reduced to its prose with `pulldown-cmark` (code blocks and
//! inline code are dropped), then CJK ideographs and whitespace-separated
//! words are counted separately because they are read at different speeds.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Ideographs read per minute.
const CJK_PER_MINUTE: f64 = 400.0;

/// Latin-script words read per minute.
const WORDS_PER_MINUTE: f64 = 200.0;

/// Reading statistics for a markdown body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingStats {
    /// Estimated reading time, never less than one minute.
    pub minutes: u32,
    /// CJK ideographs plus other words.
    pub words: u32,
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

impl ReadingStats {
    /// Estimate reading statistics for a markdown body.
    #[must_use]
    pub fn estimate(markdown: &str) -> Self {
        let text = plain_text(markdown);

        let cjk = text.chars().filter(|&c| is_cjk(c)).count();
        let latin: String = text.chars().filter(|&c| !is_cjk(c)).collect();
        let words = latin.split_whitespace().count();

        #[allow(clippy::cast_precision_loss)]
        let total = cjk as f64 / CJK_PER_MINUTE + words as f64 / WORDS_PER_MINUTE;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = (total.ceil() as u32).max(1);

        Self {
            minutes,
            words: u32::try_from(cjk + words).unwrap_or(u32::MAX),
        }
    }
}

/// Extract the readable text of a markdown document.
fn plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    let mut in_code_block = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(chunk) if !in_code_block => {
                text.push_str(&chunk);
                text.push(' ');
            }
            Event::SoftBreak | Event::HardBreak | Event::End(_) => text.push(' '),
            _ => {}
        }
    }

    text
}
