use crate::markdown::{
    elements::{Line, Text},
    text_style::{Color, TextStyle},
};
use std::mem;
use vte::{ParamsIter, Parser, Perform};

/// Turns text containing ANSI SGR escape codes into styled lines.
///
/// Any escape sequence other than SGR is dropped. Styles carry over from one line to the next, the
/// same way they would on a terminal.
pub(crate) struct AnsiParser {
    starting_style: TextStyle,
}

impl AnsiParser {
    pub(crate) fn new(current_style: TextStyle) -> Self {
        Self { starting_style: current_style }
    }

    pub(crate) fn parse_lines<I, S>(self, lines: I) -> (Vec<Line>, TextStyle)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output_lines = Vec::new();
        let mut style = self.starting_style;
        for line in lines {
            let mut handler = Handler::new(style);
            let mut parser = Parser::new();
            parser.advance(&mut handler, line.as_ref().as_bytes());

            let (line, ending_style) = handler.into_parts();
            output_lines.push(line);
            style = ending_style;
        }
        (output_lines, style)
    }

    /// Parses a whole block of text, splitting it at newlines.
    pub(crate) fn parse_text(self, text: &str) -> Vec<Line> {
        self.parse_lines(text.lines()).0
    }
}

struct Handler {
    line: Line,
    pending_text: Text,
    style: TextStyle,
}

impl Handler {
    fn new(style: TextStyle) -> Self {
        Self { line: Default::default(), pending_text: Text::new("", style), style }
    }

    fn into_parts(mut self) -> (Line, TextStyle) {
        self.save_pending_text();
        (self.line, self.style)
    }

    fn save_pending_text(&mut self) {
        if !self.pending_text.content.is_empty() {
            self.line.0.push(mem::take(&mut self.pending_text));
        }
    }

    fn parse_color(iter: &mut ParamsIter) -> Option<Color> {
        match iter.next()? {
            [2] => {
                let r = iter.next()?.first()?;
                let g = iter.next()?.first()?;
                let b = iter.next()?.first()?;
                Self::try_build_rgb_color(*r, *g, *b)
            }
            [5] => {
                let index = *iter.next()?.first()?;
                u8::try_from(index).ok().map(Color::from_xterm_index)
            }
            _ => None,
        }
    }

    fn try_build_rgb_color(r: u16, g: u16, b: u16) -> Option<Color> {
        let r = r.try_into().ok()?;
        let g = g.try_into().ok()?;
        let b = b.try_into().ok()?;
        Some(Color::new(r, g, b))
    }

    fn update_style(&self, mut codes: ParamsIter) -> TextStyle {
        let mut style = self.style;
        while let Some(&[next]) = codes.next() {
            match next {
                0 => style = Default::default(),
                1 => style = style.bold(),
                3 => style = style.italics(),
                4 => style = style.underlined(),
                9 => style = style.strikethrough(),
                39 => style.colors.foreground = None,
                49 => style.colors.background = None,
                30..=37 => style = style.fg_color(Color::from_xterm_index((next - 30) as u8)),
                40..=47 => style = style.bg_color(Color::from_xterm_index((next - 40) as u8)),
                90..=97 => style = style.fg_color(Color::from_xterm_index((next - 90 + 8) as u8)),
                100..=107 => style = style.bg_color(Color::from_xterm_index((next - 100 + 8) as u8)),
                38 => {
                    if let Some(color) = Self::parse_color(&mut codes) {
                        style = style.fg_color(color);
                    }
                }
                48 => {
                    if let Some(color) = Self::parse_color(&mut codes) {
                        style = style.bg_color(color);
                    }
                }
                _ => (),
            };
        }
        style
    }
}

impl Perform for Handler {
    fn print(&mut self, c: char) {
        self.pending_text.content.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if byte == b'\t' {
            self.pending_text.content.push_str("    ");
        }
    }

    fn csi_dispatch(&mut self, params: &vte::Params, _intermediates: &[u8], _ignore: bool, action: char) {
        if action == 'm' {
            self.save_pending_text();
            self.style = self.update_style(params.iter());
            self.pending_text.style = self.style;
        }
    }
}
