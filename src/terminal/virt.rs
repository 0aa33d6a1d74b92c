use super::printer::{TerminalCommand, TerminalError, TerminalIo};
use crate::{
    markdown::text_style::{Colors, TextStyle},
    render::properties::WindowSize,
};

/// An in-memory terminal, used to check what would be drawn on the real one.
pub(crate) struct VirtualTerminal {
    row: u16,
    column: u16,
    colors: Colors,
    rows: Vec<Vec<StyledChar>>,
    pub(crate) suspensions: usize,
    pub(crate) suspended: bool,
}

impl VirtualTerminal {
    pub(crate) fn new(dimensions: WindowSize) -> Self {
        let rows = vec![vec![StyledChar::default(); dimensions.columns as usize]; dimensions.rows as usize];
        Self { row: 0, column: 0, colors: Default::default(), rows, suspensions: 0, suspended: false }
    }

    /// The text in every row, with trailing whitespace removed.
    pub(crate) fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().map(|c| c.character).collect::<String>().trim_end().to_string()).collect()
    }

    /// All of the text on the screen, one row per line.
    pub(crate) fn contents(&self) -> String {
        self.lines().join("\n")
    }

    pub(crate) fn style_at(&self, row: u16, column: u16) -> Option<TextStyle> {
        self.rows.get(row as usize).and_then(|r| r.get(column as usize)).map(|c| c.style)
    }

    fn print_text(&mut self, content: &str, style: &TextStyle) {
        let style = style.merged(&TextStyle::colored(self.colors));
        for c in content.chars() {
            if let Some(cell) = self.rows.get_mut(self.row as usize).and_then(|row| row.get_mut(self.column as usize)) {
                cell.character = c;
                cell.style = style;
            }
            self.column += 1;
        }
    }

    fn clear_screen(&mut self) {
        for row in &mut self.rows {
            for cell in row {
                *cell = StyledChar::default();
            }
        }
    }
}

impl TerminalIo for VirtualTerminal {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError> {
        use TerminalCommand::*;
        match command {
            BeginUpdate | EndUpdate | Flush => (),
            MoveTo { column, row } => {
                self.column = *column;
                self.row = *row;
            }
            PrintText { content, style } => self.print_text(content, style),
            ClearScreen => self.clear_screen(),
            SetColors(colors) => self.colors = *colors,
        };
        Ok(())
    }

    fn suspend(&mut self) {
        self.suspensions += 1;
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StyledChar {
    pub(crate) character: char,
    pub(crate) style: TextStyle,
}

impl Default for StyledChar {
    fn default() -> Self {
        Self { character: ' ', style: Default::default() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dimensions(rows: u16, columns: u16) -> WindowSize {
        WindowSize { rows, columns, width: 0, height: 0 }
    }

    #[test]
    fn text() {
        let mut term = VirtualTerminal::new(dimensions(2, 3));
        term.execute(&TerminalCommand::PrintText { content: "abc", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::MoveTo { column: 0, row: 1 }).unwrap();
        term.execute(&TerminalCommand::PrintText { content: "A", style: Default::default() }).unwrap();
        assert_eq!(term.lines(), &["abc", "A"]);
    }

    #[test]
    fn overflow_is_dropped() {
        let mut term = VirtualTerminal::new(dimensions(1, 2));
        term.execute(&TerminalCommand::PrintText { content: "abcd", style: Default::default() }).unwrap();
        assert_eq!(term.lines(), &["ab"]);
    }

    #[test]
    fn clear() {
        let mut term = VirtualTerminal::new(dimensions(1, 3));
        term.execute(&TerminalCommand::PrintText { content: "abc", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::ClearScreen).unwrap();
        assert_eq!(term.contents(), "");
    }
}
