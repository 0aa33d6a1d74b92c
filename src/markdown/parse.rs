use crate::{
    code::{highlighting::CodeHighlighter, snippet::SnippetLanguage},
    markdown::{
        elements::{Line, Text},
        text_style::TextStyle,
    },
    theme::PresentationTheme,
};
use comrak::{
    Arena, Options, parse_document,
    nodes::{AstNode, ListType, NodeValue},
};

const BLOCK_QUOTE_PREFIX: &str = "▍ ";
const BULLETS: [&str; 3] = ["•", "◦", "▪"];

/// Turns markdown into styled lines of text.
///
/// Any markdown construct that isn't supported is turned into its plain text.
pub(crate) struct MarkdownParser<'a> {
    theme: &'a PresentationTheme,
    highlighter: Option<CodeHighlighter>,
    width: u16,
}

impl<'a> MarkdownParser<'a> {
    pub(crate) fn new(theme: &'a PresentationTheme, width: u16) -> Self {
        let highlighter = CodeHighlighter::new(theme.highlight_theme);
        Self { theme, highlighter, width }
    }

    pub(crate) fn parse(&self, contents: &str) -> Vec<Line> {
        let arena = Arena::new();
        let mut options = Options::default();
        options.extension.strikethrough = true;
        let root = parse_document(&arena, contents, &options);

        let mut lines = Vec::new();
        for node in root.children() {
            self.parse_block(node, &mut lines);
        }
        while lines.last().is_some_and(Line::is_empty) {
            lines.pop();
        }
        lines
    }

    fn parse_block<'n>(&self, node: &'n AstNode<'n>, lines: &mut Vec<Line>) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => {
                let style = self.theme.heading(heading.level);
                lines.extend(split_lines(self.parse_inlines(node, style)));
                lines.push(Line::default());
            }
            NodeValue::Paragraph => {
                lines.extend(split_lines(self.parse_inlines(node, TextStyle::default())));
                lines.push(Line::default());
            }
            NodeValue::List(_) => {
                self.parse_list(node, 0, lines);
                lines.push(Line::default());
            }
            NodeValue::CodeBlock(block) => {
                let language: SnippetLanguage = match block.info.split_whitespace().next() {
                    Some(language) => language.parse().unwrap_or(SnippetLanguage::Unknown(language.to_string())),
                    None => SnippetLanguage::Unknown(String::new()),
                };
                let code: Vec<&str> = block.literal.lines().collect();
                lines.extend(self.code_block(&code, &language));
                lines.push(Line::default());
            }
            NodeValue::BlockQuote => {
                let mut inner = Vec::new();
                for child in node.children() {
                    self.parse_block(child, &mut inner);
                }
                while inner.last().is_some_and(Line::is_empty) {
                    inner.pop();
                }
                for mut line in inner {
                    line.apply_style(&self.theme.block_quote);
                    line.0.insert(0, Text::new(BLOCK_QUOTE_PREFIX, self.theme.block_quote));
                    lines.push(line);
                }
                lines.push(Line::default());
            }
            NodeValue::ThematicBreak => {
                lines.push(Line::from(Text::new("─".repeat(self.width as usize), self.theme.footer)));
                lines.push(Line::default());
            }
            _ => {
                let text = plain_text(node);
                lines.extend(text.lines().map(Line::from));
                lines.push(Line::default());
            }
        }
    }

    fn parse_list<'n>(&self, node: &'n AstNode<'n>, depth: usize, lines: &mut Vec<Line>) {
        let mut number = match &node.data.borrow().value {
            NodeValue::List(list) => list.start,
            _ => 1,
        };
        for item in node.children() {
            let list_type = match &item.data.borrow().value {
                NodeValue::Item(list) => list.list_type,
                _ => ListType::Bullet,
            };
            let marker = match list_type {
                ListType::Bullet => BULLETS[depth % BULLETS.len()].to_string(),
                ListType::Ordered => format!("{number}."),
            };
            number += 1;
            let indent = "  ".repeat(depth);
            let mut first = true;
            for child in item.children() {
                if matches!(child.data.borrow().value, NodeValue::List(_)) {
                    self.parse_list(child, depth + 1, lines);
                    continue;
                }
                for line in split_lines(self.parse_inlines(child, TextStyle::default())) {
                    let prefix = match first {
                        true => format!("{indent}{marker} "),
                        false => " ".repeat(indent.len() + marker.chars().count() + 1),
                    };
                    first = false;
                    let mut texts = vec![Text::from(prefix)];
                    texts.extend(line.0);
                    lines.push(Line(texts));
                }
            }
        }
    }

    /// Builds the lines for a block of code, all of them padded to the same width.
    pub(crate) fn code_block(&self, code: &[&str], language: &SnippetLanguage) -> Vec<Line> {
        let background = self.theme.code_background;
        let mut lines = match &self.highlighter {
            Some(highlighter) => highlighter.highlight(code.iter().copied(), language, Some(background)),
            None => code.iter().map(|line| Line::from(line.replace('\t', "    "))).collect(),
        };
        let style = TextStyle::default().bg_color(background);
        let block_width = lines.iter().map(Line::width).max().unwrap_or(0) + 2;
        for line in &mut lines {
            let padding = block_width - line.width() - 1;
            line.0.insert(0, Text::new(" ", style));
            line.0.push(Text::new(" ".repeat(padding), style));
        }
        lines
    }

    fn parse_inlines<'n>(&self, node: &'n AstNode<'n>, style: TextStyle) -> Vec<InlineText> {
        let mut output = Vec::new();
        for child in node.children() {
            self.collect_inline(child, style, &mut output);
        }
        output
    }

    fn collect_inline<'n>(&self, node: &'n AstNode<'n>, style: TextStyle, output: &mut Vec<InlineText>) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Text(text) => output.push(InlineText::Text(Text::new(text.to_string(), style))),
            NodeValue::Code(code) => {
                output.push(InlineText::Text(Text::new(code.literal.clone(), self.theme.inline_code.merged(&style))))
            }
            NodeValue::Strong => self.collect_children(node, style.bold(), output),
            NodeValue::Emph => self.collect_children(node, style.italics(), output),
            NodeValue::Strikethrough => self.collect_children(node, style.strikethrough(), output),
            NodeValue::Link(_) => self.collect_children(node, self.theme.link.merged(&style), output),
            NodeValue::SoftBreak => output.push(InlineText::Text(Text::new(" ", style))),
            NodeValue::LineBreak => output.push(InlineText::LineBreak),
            _ => {
                let text = plain_text(node);
                if !text.is_empty() {
                    output.push(InlineText::Text(Text::new(text, style)));
                }
            }
        }
    }

    fn collect_children<'n>(&self, node: &'n AstNode<'n>, style: TextStyle, output: &mut Vec<InlineText>) {
        for child in node.children() {
            self.collect_inline(child, style, output);
        }
    }
}

enum InlineText {
    Text(Text),
    LineBreak,
}

fn split_lines(inlines: Vec<InlineText>) -> Vec<Line> {
    let mut lines = vec![Line::default()];
    for inline in inlines {
        match inline {
            InlineText::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.0.push(text);
                }
            }
            InlineText::LineBreak => lines.push(Line::default()),
        }
    }
    lines
}

fn plain_text<'n>(node: &'n AstNode<'n>) -> String {
    let mut output = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(text) => output.push_str(text),
            NodeValue::Code(code) => output.push_str(&code.literal),
            NodeValue::CodeBlock(block) => output.push_str(&block.literal),
            NodeValue::HtmlBlock(block) => output.push_str(&block.literal),
            NodeValue::HtmlInline(html) => output.push_str(html),
            NodeValue::SoftBreak => output.push(' '),
            NodeValue::LineBreak | NodeValue::Paragraph if !output.is_empty() && !output.ends_with('\n') => {
                output.push('\n')
            }
            _ => (),
        }
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::theme::ThemeName;
    use rstest::rstest;

    fn parse(input: &str) -> Vec<Line> {
        let theme = PresentationTheme::new(ThemeName::Dark);
        MarkdownParser::new(&theme, 40).parse(input)
    }

    fn parse_text(input: &str) -> Vec<String> {
        parse(input).iter().map(Line::plain_text).collect()
    }

    #[rstest]
    #[case::heading("# Title", &["Title"])]
    #[case::subheading("## Title", &["Title"])]
    #[case::paragraph("hello *there*\nfriend", &["hello there friend"])]
    #[case::paragraphs("one\n\ntwo", &["one", "", "two"])]
    #[case::bullets("* a\n* b", &["• a", "• b"])]
    #[case::nested("* a\n    * b", &["• a", "  ◦ b"])]
    #[case::ordered("3. a\n4. b", &["3. a", "4. b"])]
    #[case::quote("> wise words", &["▍ wise words"])]
    #[case::inline_code("run `ls`", &["run ls"])]
    #[case::link("[site](http://example.com)", &["site"])]
    fn text(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_text(input), expected);
    }

    #[test]
    fn heading_style() {
        let theme = PresentationTheme::new(ThemeName::Dark);
        let lines = MarkdownParser::new(&theme, 40).parse("# Title");
        assert_eq!(lines[0].0[0].style, theme.heading(1));
    }

    #[test]
    fn emphasis_styles() {
        let lines = parse("**bold** _it_ ~~gone~~");
        let texts = &lines[0].0;
        assert!(texts[0].style.is_bold());
        assert!(texts[2].style.is_italics());
        assert!(texts[4].style.is_strikethrough());
    }

    #[test]
    fn code_block_padded() {
        let lines = parse("```python\nx = 1\nprint(x)\n```");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].width(), lines[1].width());
        assert_eq!(lines[1].plain_text().trim_end(), " print(x)");
    }

    #[test]
    fn thematic_break() {
        let lines = parse("a\n\n---\n\nb");
        assert_eq!(lines[2].width(), 40);
    }

    #[test]
    fn line_break() {
        assert_eq!(parse_text("a  \nb"), &["a", "b"]);
    }
}
