use crate::{
    code::snippet::SnippetLanguage,
    markdown::{
        elements::{Line, Text},
        text_style::{Color, TextStyle},
    },
};
use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, Theme, ThemeSet},
    parsing::SyntaxSet,
};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Highlights code using one of [syntect]'s built-in themes.
#[derive(Clone, Copy)]
pub(crate) struct CodeHighlighter {
    theme: &'static Theme,
}

impl CodeHighlighter {
    /// Construct a new highlighter using the given [syntect] theme name.
    pub(crate) fn new(theme_name: &str) -> Option<Self> {
        THEMES.themes.get(theme_name).map(|theme| Self { theme })
    }

    /// Highlight some lines of code.
    ///
    /// Every token takes the background color from `background` rather than the theme, so code blocks
    /// look the same no matter which theme is used.
    pub(crate) fn highlight<'a, I>(&self, lines: I, language: &SnippetLanguage, background: Option<Color>) -> Vec<Line>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let syntax = SYNTAX_SET
            .find_syntax_by_extension(Self::language_extension(language))
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, self.theme);
        let mut output = Vec::new();
        for line in lines {
            let line = format!("{}\n", line.replace('\t', "    "));
            let texts = match highlighter.highlight_line(&line, &SYNTAX_SET) {
                Ok(tokens) => tokens.into_iter().map(|(style, tokens)| Self::styled_text(style, tokens)).collect(),
                Err(e) => {
                    tracing::warn!("failed to highlight line: {e}");
                    vec![Text::from(line.trim_end_matches('\n'))]
                }
            };
            let mut line = Line(texts);
            if let Some(background) = background {
                line.apply_style(&TextStyle::default().bg_color(background));
            }
            output.push(line);
        }
        output
    }

    fn styled_text(style: Style, tokens: &str) -> Text {
        let mut text_style = TextStyle::default();
        text_style.colors.foreground = parse_color(style.foreground);
        let text: String = tokens.split('\n').collect();
        Text::new(text, text_style)
    }

    fn language_extension(language: &SnippetLanguage) -> &'static str {
        use SnippetLanguage::*;
        match language {
            Bash | Shell | Zsh => "sh",
            C => "c",
            Cpp => "cpp",
            Go => "go",
            Java => "java",
            // syntect's built-in syntaxes don't include typescript
            JavaScript | TypeScript => "js",
            Json => "json",
            Lua => "lua",
            Markdown => "md",
            Perl => "pl",
            Php => "php",
            Python => "py",
            Ruby => "rb",
            Rust => "rs",
            Sql => "sql",
            Yaml => "yaml",
            Unknown(_) => "txt",
        }
    }
}

// This code has been adapted from bat's: https://github.com/sharkdp/bat
fn parse_color(color: syntect::highlighting::Color) -> Option<Color> {
    if color.a == 0 {
        Some(Color::from_xterm_index(color.r))
    } else if color.a == 1 {
        None
    } else {
        Some(Color::new(color.r, color.g, color.b))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn language_extensions_exist() {
        for language in SnippetLanguage::iter() {
            let extension = CodeHighlighter::language_extension(&language);
            let syntax = SYNTAX_SET.find_syntax_by_extension(extension);
            assert!(syntax.is_some(), "extension {extension} for {language:?} not found");
        }
    }

    #[test]
    fn unknown_theme() {
        assert!(CodeHighlighter::new("potato").is_none());
    }

    #[test]
    fn keeps_text() {
        let highlighter = CodeHighlighter::new("base16-eighties.dark").expect("theme not found");
        let lines = highlighter.highlight(["def f():", "\treturn 1"], &SnippetLanguage::Python, None);
        let lines: Vec<_> = lines.iter().map(Line::plain_text).collect();
        assert_eq!(lines, &["def f():", "    return 1"]);
    }

    #[test]
    fn background_applied() {
        let highlighter = CodeHighlighter::new("InspiredGitHub").expect("theme not found");
        let background = Color::new(1, 2, 3);
        let lines = highlighter.highlight(["let x = 42;"], &SnippetLanguage::Rust, Some(background));
        for text in &lines[0].0 {
            assert_eq!(text.style.colors.background, Some(background));
        }
    }
}
