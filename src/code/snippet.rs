use std::{convert::Infallible, fmt, str::FromStr};
use strum::EnumIter;

/// A piece of code that can be shown and possibly executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Snippet {
    /// The snippet's contents, including any hidden lines.
    pub(crate) contents: String,

    /// The language this snippet is written in.
    pub(crate) language: SnippetLanguage,
}

impl Snippet {
    pub(crate) fn new<S: Into<String>>(contents: S, language: SnippetLanguage) -> Self {
        Self { contents: contents.into(), language }
    }

    /// The lines that should be shown to the audience.
    ///
    /// Any line ending in `hidden_line_marker` is skipped, as well as any blank lines surrounding the
    /// ones left.
    pub(crate) fn visible_lines<'a>(&'a self, hidden_line_marker: Option<&'a str>) -> Vec<&'a str> {
        let lines: Vec<_> = self
            .contents
            .lines()
            .filter(|line| !hidden_line_marker.is_some_and(|marker| line.trim_end().ends_with(marker)))
            .collect();
        let start = lines.iter().position(|line| !line.trim().is_empty()).unwrap_or(lines.len());
        let end = lines.iter().rposition(|line| !line.trim().is_empty()).map(|i| i + 1).unwrap_or(start);
        lines[start..end].to_vec()
    }

    /// The code that should be executed: every line, hidden or not.
    pub(crate) fn executable_contents(&self) -> &str {
        &self.contents
    }
}

/// The language of a code snippet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub(crate) enum SnippetLanguage {
    Bash,
    C,
    Cpp,
    Go,
    Java,
    JavaScript,
    Json,
    Lua,
    Markdown,
    Perl,
    Php,
    Python,
    Ruby,
    Rust,
    Shell,
    Sql,
    TypeScript,
    Yaml,
    Zsh,
    Unknown(String),
}

crate::utils::impl_deserialize_from_str!(SnippetLanguage);

impl SnippetLanguage {
    /// The default marker used to hide lines of code written in this language.
    pub(crate) fn default_hidden_line_marker(&self) -> Option<&'static str> {
        use SnippetLanguage::*;
        match self {
            Bash | Shell | Zsh | Python | Ruby | Perl | Yaml => Some("# HIDE"),
            C | Cpp | Go | Java | JavaScript | Php | Rust | TypeScript => Some("// HIDE"),
            Lua | Sql => Some("-- HIDE"),
            Json | Markdown | Unknown(_) => None,
        }
    }
}

impl FromStr for SnippetLanguage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use SnippetLanguage::*;
        let language = match s.to_lowercase().as_str() {
            "bash" => Bash,
            "c" => C,
            "cpp" | "c++" => Cpp,
            "go" => Go,
            "java" => Java,
            "javascript" | "js" => JavaScript,
            "json" => Json,
            "lua" => Lua,
            "markdown" | "md" => Markdown,
            "perl" => Perl,
            "php" => Php,
            "python" | "py" => Python,
            "ruby" | "rb" => Ruby,
            "rust" | "rs" => Rust,
            "shell" | "sh" => Shell,
            "sql" => Sql,
            "typescript" | "ts" => TypeScript,
            "yaml" | "yml" => Yaml,
            "zsh" => Zsh,
            other => Unknown(other.to_string()),
        };
        Ok(language)
    }
}

impl fmt::Display for SnippetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SnippetLanguage::*;
        let name = match self {
            Bash => "bash",
            C => "c",
            Cpp => "cpp",
            Go => "go",
            Java => "java",
            JavaScript => "javascript",
            Json => "json",
            Lua => "lua",
            Markdown => "markdown",
            Perl => "perl",
            Php => "php",
            Python => "python",
            Ruby => "ruby",
            Rust => "rust",
            Shell => "shell",
            Sql => "sql",
            TypeScript => "typescript",
            Yaml => "yaml",
            Zsh => "zsh",
            Unknown(name) => name,
        };
        write!(f, "{name}")
    }
}
