use super::text_style::TextStyle;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A styled piece of text.
///
/// This is the most granular text representation: a `String` and a style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Text {
    pub(crate) content: String,
    pub(crate) style: TextStyle,
}

impl Text {
    /// Construct a new styled text.
    pub(crate) fn new<S: Into<String>>(content: S, style: TextStyle) -> Self {
        Self { content: content.into(), style }
    }

    pub(crate) fn width(&self) -> usize {
        self.content.width()
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Self { content: text, style: TextStyle::default() }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self { content: text.into(), style: TextStyle::default() }
    }
}

/// A line of text, made up of a sequence of styled chunks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Line(pub(crate) Vec<Text>);

impl Line {
    /// Get the total width for this line.
    pub(crate) fn width(&self) -> usize {
        self.0.iter().map(Text::width).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.iter().all(|text| text.content.is_empty())
    }

    /// Applies the given style to every chunk in this line.
    pub(crate) fn apply_style(&mut self, style: &TextStyle) {
        for text in &mut self.0 {
            text.style.merge(style);
        }
    }

    /// The plain text in this line, without any styling.
    pub(crate) fn plain_text(&self) -> String {
        self.0.iter().map(|text| text.content.as_str()).collect()
    }

    /// Cuts this line so it's at most `max_width` columns wide.
    pub(crate) fn truncated(&self, max_width: usize) -> Line {
        let mut output = Vec::new();
        let mut remaining = max_width;
        for text in &self.0 {
            if remaining == 0 {
                break;
            }
            let mut content = String::new();
            for c in text.content.chars() {
                let width = c.width().unwrap_or(0);
                if width > remaining {
                    remaining = 0;
                    break;
                }
                remaining -= width;
                content.push(c);
            }
            output.push(Text::new(content, text.style));
        }
        Line(output)
    }

    /// Splits this line into several lines that fit in `max_width` columns.
    ///
    /// Splitting happens at whitespace; a single word wider than `max_width` is cut.
    pub(crate) fn wrapped(&self, max_width: usize) -> Vec<Line> {
        if max_width == 0 || self.width() <= max_width {
            return vec![self.clone()];
        }
        let mut lines = Vec::new();
        let mut current = Line::default();
        let mut current_width = 0;
        for text in &self.0 {
            for word in split_keeping_whitespace(&text.content) {
                let word_width = word.width();
                if current_width + word_width > max_width && current_width > 0 {
                    lines.push(current.trimmed_end());
                    current = Line::default();
                    current_width = 0;
                    if word.trim().is_empty() {
                        continue;
                    }
                }
                if word_width > max_width {
                    let cut = Line::from(Text::new(word, text.style)).truncated(max_width);
                    lines.push(cut);
                    continue;
                }
                current.push(Text::new(word, text.style));
                current_width += word_width;
            }
        }
        if current_width > 0 || lines.is_empty() {
            lines.push(current.trimmed_end());
        }
        lines
    }

    fn push(&mut self, text: Text) {
        match self.0.last_mut() {
            Some(last) if last.style == text.style => last.content.push_str(&text.content),
            _ => self.0.push(text),
        }
    }

    fn trimmed_end(mut self) -> Line {
        while let Some(last) = self.0.last_mut() {
            let trimmed_len = last.content.trim_end().len();
            last.content.truncate(trimmed_len);
            if last.content.is_empty() {
                self.0.pop();
            } else {
                break;
            }
        }
        self
    }
}

fn split_keeping_whitespace(input: &str) -> Vec<&str> {
    let mut output = Vec::new();
    let mut start = 0;
    let mut in_whitespace = None;
    for (index, c) in input.char_indices() {
        let is_whitespace = c.is_whitespace();
        if in_whitespace.is_some_and(|previous| previous != is_whitespace) {
            output.push(&input[start..index]);
            start = index;
        }
        in_whitespace = Some(is_whitespace);
    }
    if start < input.len() {
        output.push(&input[start..]);
    }
    output
}

impl<T: Into<Text>> From<T> for Line {
    fn from(text: T) -> Self {
        Self(vec![text.into()])
    }
}
