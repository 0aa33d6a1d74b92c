use crossterm::style::{StyledContent, Stylize};

/// The style of a piece of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextStyle {
    flags: u8,
    pub(crate) colors: Colors,
}

impl TextStyle {
    pub(crate) fn colored(colors: Colors) -> Self {
        Self { flags: Default::default(), colors }
    }

    /// Add bold to this style.
    pub(crate) fn bold(self) -> Self {
        self.add_flag(TextFormatFlags::Bold)
    }

    /// Add italics to this style.
    pub(crate) fn italics(self) -> Self {
        self.add_flag(TextFormatFlags::Italics)
    }

    /// Add strikethrough to this style.
    pub(crate) fn strikethrough(self) -> Self {
        self.add_flag(TextFormatFlags::Strikethrough)
    }

    /// Add underline to this style.
    pub(crate) fn underlined(self) -> Self {
        self.add_flag(TextFormatFlags::Underlined)
    }

    /// Set the background color for this text style.
    pub(crate) fn bg_color(mut self, color: Color) -> Self {
        self.colors.background = Some(color);
        self
    }

    /// Set the foreground color for this text style.
    pub(crate) fn fg_color(mut self, color: Color) -> Self {
        self.colors.foreground = Some(color);
        self
    }

    pub(crate) fn is_bold(&self) -> bool {
        self.has_flag(TextFormatFlags::Bold)
    }

    pub(crate) fn is_italics(&self) -> bool {
        self.has_flag(TextFormatFlags::Italics)
    }

    pub(crate) fn is_strikethrough(&self) -> bool {
        self.has_flag(TextFormatFlags::Strikethrough)
    }

    pub(crate) fn is_underlined(&self) -> bool {
        self.has_flag(TextFormatFlags::Underlined)
    }

    /// Merge this style with another one.
    ///
    /// Colors already set in this style win over the ones in `other`.
    pub(crate) fn merge(&mut self, other: &TextStyle) {
        self.flags |= other.flags;
        self.colors = self.colors.merge(&other.colors);
    }

    /// Same as [TextStyle::merge] but returns a new style.
    pub(crate) fn merged(mut self, other: &TextStyle) -> Self {
        self.merge(other);
        self
    }

    /// Apply this style to a piece of text.
    pub(crate) fn apply<T: Into<String>>(&self, text: T) -> StyledContent<String> {
        let text: String = text.into();
        let mut styled = text.stylize();
        if self.is_bold() {
            styled = styled.bold();
        }
        if self.is_italics() {
            styled = styled.italic();
        }
        if self.is_strikethrough() {
            styled = styled.crossed_out();
        }
        if self.is_underlined() {
            styled = styled.underlined();
        }
        if let Some(color) = self.colors.background {
            styled = styled.on(color.into());
        }
        if let Some(color) = self.colors.foreground {
            styled = styled.with(color.into());
        }
        styled
    }

    fn add_flag(mut self, flag: TextFormatFlags) -> Self {
        self.flags |= flag as u8;
        self
    }

    fn has_flag(&self, flag: TextFormatFlags) -> bool {
        self.flags & flag as u8 != 0
    }
}

#[derive(Debug)]
enum TextFormatFlags {
    Bold = 1,
    Italics = 2,
    Strikethrough = 4,
    Underlined = 8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Color {
    Black,
    DarkGrey,
    Red,
    DarkRed,
    Green,
    DarkGreen,
    Yellow,
    DarkYellow,
    Blue,
    DarkBlue,
    Magenta,
    DarkMagenta,
    Cyan,
    DarkCyan,
    White,
    Grey,
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    pub(crate) fn new(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    /// Builds a color out of one of the 256 entries in the xterm palette.
    pub(crate) fn from_xterm_index(index: u8) -> Self {
        match index {
            0..=15 => Self::standard(index),
            16..=231 => {
                const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
                let value = index - 16;
                let r = STEPS[(value / 36) as usize];
                let g = STEPS[((value / 6) % 6) as usize];
                let b = STEPS[(value % 6) as usize];
                Self::new(r, g, b)
            }
            232..=255 => {
                let level = 8 + (index - 232) * 10;
                Self::new(level, level, level)
            }
        }
    }

    /// The 16 standard colors, where 8-15 are the bright variants.
    fn standard(index: u8) -> Self {
        match index {
            0 => Self::Black,
            1 => Self::DarkRed,
            2 => Self::DarkGreen,
            3 => Self::DarkYellow,
            4 => Self::DarkBlue,
            5 => Self::DarkMagenta,
            6 => Self::DarkCyan,
            7 => Self::Grey,
            8 => Self::DarkGrey,
            9 => Self::Red,
            10 => Self::Green,
            11 => Self::Yellow,
            12 => Self::Blue,
            13 => Self::Magenta,
            14 => Self::Cyan,
            _ => Self::White,
        }
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(value: Color) -> Self {
        use crossterm::style::Color as C;
        match value {
            Color::Black => C::Black,
            Color::DarkGrey => C::DarkGrey,
            Color::Red => C::Red,
            Color::DarkRed => C::DarkRed,
            Color::Green => C::Green,
            Color::DarkGreen => C::DarkGreen,
            Color::Yellow => C::Yellow,
            Color::DarkYellow => C::DarkYellow,
            Color::Blue => C::Blue,
            Color::DarkBlue => C::DarkBlue,
            Color::Magenta => C::Magenta,
            Color::DarkMagenta => C::DarkMagenta,
            Color::Cyan => C::Cyan,
            Color::DarkCyan => C::DarkCyan,
            Color::White => C::White,
            Color::Grey => C::Grey,
            Color::Rgb { r, g, b } => C::Rgb { r, g, b },
        }
    }
}

/// Text colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Colors {
    /// The background color.
    pub(crate) background: Option<Color>,

    /// The foreground color.
    pub(crate) foreground: Option<Color>,
}

impl Colors {
    pub(crate) fn merge(&self, other: &Colors) -> Self {
        let background = self.background.or(other.background);
        let foreground = self.foreground.or(other.foreground);
        Self { background, foreground }
    }
}

impl From<Colors> for crossterm::style::Colors {
    fn from(value: Colors) -> Self {
        Self { foreground: value.foreground.map(Into::into), background: value.background.map(Into::into) }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::standard(1, Color::DarkRed)]
    #[case::bright(9, Color::Red)]
    #[case::cube_start(16, Color::new(0, 0, 0))]
    #[case::cube_blue(21, Color::new(0, 0, 255))]
    #[case::cube_end(231, Color::new(255, 255, 255))]
    #[case::grayscale(232, Color::new(8, 8, 8))]
    fn xterm_palette(#[case] index: u8, #[case] expected: Color) {
        assert_eq!(Color::from_xterm_index(index), expected);
    }

    #[test]
    fn merge_keeps_own_colors() {
        let style = TextStyle::default().fg_color(Color::Red);
        let other = TextStyle::default().bold().fg_color(Color::Blue).bg_color(Color::Black);
        let merged = style.merged(&other);
        assert!(merged.is_bold());
        assert_eq!(merged.colors.foreground, Some(Color::Red));
        assert_eq!(merged.colors.background, Some(Color::Black));
    }
}
