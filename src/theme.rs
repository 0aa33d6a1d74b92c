use crate::markdown::text_style::{Color, Colors, TextStyle};
use serde::Deserialize;

/// The built-in themes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    /// The other theme.
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// The styles used to draw a presentation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PresentationTheme {
    pub(crate) name: ThemeName,
    pub(crate) default_colors: Colors,
    pub(crate) headings: [TextStyle; 3],
    pub(crate) inline_code: TextStyle,
    pub(crate) code_background: Color,
    pub(crate) block_quote: TextStyle,
    pub(crate) link: TextStyle,
    pub(crate) title: TextStyle,
    pub(crate) footer: TextStyle,

    /// The name of the syntect theme used to highlight code.
    pub(crate) highlight_theme: &'static str,
}

impl PresentationTheme {
    pub(crate) fn new(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    fn dark() -> Self {
        let background = Color::new(0x04, 0x0c, 0x1c);
        let foreground = Color::new(0xe6, 0xe6, 0xe6);
        Self {
            name: ThemeName::Dark,
            default_colors: Colors { background: Some(background), foreground: Some(foreground) },
            headings: [
                TextStyle::default().bold().fg_color(Color::new(0xee, 0x9c, 0x40)),
                TextStyle::default().bold().fg_color(Color::new(0x7a, 0xa2, 0xf7)),
                TextStyle::default().bold().fg_color(Color::new(0x9e, 0xce, 0x6a)),
            ],
            inline_code: TextStyle::default().fg_color(Color::new(0xf7, 0x76, 0x8e)),
            code_background: Color::new(0x29, 0x2e, 0x42),
            block_quote: TextStyle::default().italics().fg_color(Color::new(0xa9, 0xb1, 0xd6)),
            link: TextStyle::default().underlined().fg_color(Color::new(0x7d, 0xcf, 0xff)),
            title: TextStyle::default().bold().fg_color(Color::new(0xee, 0x9c, 0x40)),
            footer: TextStyle::default().fg_color(Color::new(0x56, 0x5f, 0x89)),
            highlight_theme: "base16-eighties.dark",
        }
    }

    fn light() -> Self {
        let background = Color::new(0xfa, 0xfa, 0xfa);
        let foreground = Color::new(0x21, 0x21, 0x21);
        Self {
            name: ThemeName::Light,
            default_colors: Colors { background: Some(background), foreground: Some(foreground) },
            headings: [
                TextStyle::default().bold().fg_color(Color::new(0xb5, 0x52, 0x00)),
                TextStyle::default().bold().fg_color(Color::new(0x1e, 0x5a, 0xc8)),
                TextStyle::default().bold().fg_color(Color::new(0x38, 0x7a, 0x1c)),
            ],
            inline_code: TextStyle::default().fg_color(Color::new(0xc0, 0x26, 0x5c)),
            code_background: Color::new(0xea, 0xea, 0xef),
            block_quote: TextStyle::default().italics().fg_color(Color::new(0x5a, 0x5a, 0x6e)),
            link: TextStyle::default().underlined().fg_color(Color::new(0x1e, 0x5a, 0xc8)),
            title: TextStyle::default().bold().fg_color(Color::new(0xb5, 0x52, 0x00)),
            footer: TextStyle::default().fg_color(Color::new(0x8a, 0x8a, 0x9a)),
            highlight_theme: "InspiredGitHub",
        }
    }

    /// The style for a heading of the given level, starting at 1.
    pub(crate) fn heading(&self, level: u8) -> TextStyle {
        let index = usize::from(level.saturating_sub(1)).min(self.headings.len() - 1);
        self.headings[index]
    }
}
