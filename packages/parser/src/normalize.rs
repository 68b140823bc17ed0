//! Paragraph text normalization
//!
//! Generators hard-wrap prose. A line break inside a paragraph is folded
//! into a space unless it sits where a writer would plausibly break on
//! purpose: after sentence-ending punctuation or a closing quote, or before
//! an opening quote or a capital letter. The rule only looks at the
//! characters around the break, so normalizing twice changes nothing.

const SENTENCE_END: &[char] = &['.', '!', '?', '…', '。', '！', '？'];
const CLOSING_QUOTES: &[char] = &['"', '\u{201D}', '\u{2019}', '\u{00BB}', '\u{300D}'];
const OPENING_QUOTES: &[char] = &['"', '\u{201C}', '\u{2018}', '\u{00AB}', '\u{201E}', '\u{300C}'];

/// Normalize the text of one paragraph
pub fn normalize_paragraph(text: &str) -> String {
    let chars: Vec<char> = text.trim().chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if !c.is_whitespace() {
            out.push(c);
            i += 1;
            continue;
        }

        // Swallow the whole whitespace run
        let mut has_break = false;
        while i < chars.len() && chars[i].is_whitespace() {
            has_break |= chars[i] == '\n';
            i += 1;
        }

        if !has_break {
            out.push(' ');
            continue;
        }

        let prev = out.chars().last();
        let next = chars.get(i).copied();
        if keeps_break(prev, next) {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }

    out
}

fn keeps_break(prev: Option<char>, next: Option<char>) -> bool {
    let after_stop = prev.is_some_and(|c| SENTENCE_END.contains(&c) || CLOSING_QUOTES.contains(&c));
    let before_start = next.is_some_and(|c| OPENING_QUOTES.contains(&c) || c.is_uppercase());
    after_stop || before_start
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
