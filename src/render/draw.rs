use super::{
    RenderError,
    payload::DisplayPayload,
    properties::{ColorCapability, ViewerContext, WindowSize},
};
use crate::{
    markdown::{elements::Line, text_style::TextStyle},
    terminal::printer::{TerminalCommand, TerminalIo},
    theme::PresentationTheme,
};
use unicode_width::UnicodeWidthStr;

/// Everything that's needed to draw a slide.
pub(crate) struct Frame<'a> {
    pub(crate) payload: &'a DisplayPayload,
    pub(crate) theme: &'a PresentationTheme,
    pub(crate) footer: FooterInfo<'a>,
}

/// The contents of the footer.
pub(crate) struct FooterInfo<'a> {
    /// The index of the slide being shown, starting at 0.
    pub(crate) current_slide: usize,
    pub(crate) total_slides: usize,
    pub(crate) hints: &'a str,
}

/// The place slides are shown in.
pub(crate) trait DisplaySurface {
    /// Describes the area slides are drawn into.
    fn viewer_context(&self) -> Result<ViewerContext, RenderError>;

    /// Replace whatever is being shown with this frame.
    fn mount(&mut self, frame: &Frame) -> Result<(), RenderError>;

    /// Hand the terminal over to someone else.
    fn suspend(&mut self);

    /// Take the terminal back after a [DisplaySurface::suspend].
    fn resume(&mut self);

    /// Clear the screen and put the cursor on its top left corner.
    fn clear(&mut self) -> Result<(), RenderError>;
}

pub(crate) struct TerminalDrawerOptions {
    /// The max width in columns that the presentation should be capped to.
    pub(crate) max_columns: u16,

    /// Whether to show the footer.
    pub(crate) show_footer: bool,
}

impl Default for TerminalDrawerOptions {
    fn default() -> Self {
        Self { max_columns: u16::MAX, show_footer: true }
    }
}

/// Draws slides on a terminal.
pub(crate) struct TerminalDrawer<I: TerminalIo> {
    pub(crate) terminal: I,
    options: TerminalDrawerOptions,
    color_capability: ColorCapability,
    fixed_size: Option<WindowSize>,
}

impl<I: TerminalIo> TerminalDrawer<I> {
    pub(crate) fn new(terminal: I, options: TerminalDrawerOptions) -> Self {
        Self { terminal, options, color_capability: ColorCapability::detect(), fixed_size: None }
    }

    /// Always draw as if the terminal had these dimensions.
    #[cfg(test)]
    pub(crate) fn with_fixed_size(mut self, size: WindowSize) -> Self {
        self.fixed_size = Some(size);
        self
    }

    fn window_size(&self) -> Result<WindowSize, RenderError> {
        match self.fixed_size {
            Some(size) => Ok(size),
            None => Ok(WindowSize::current()?),
        }
    }

    fn layout(&self, frame: &Frame, context: &ViewerContext) -> Vec<Line> {
        let mut lines = Vec::new();
        for line in frame.payload.lines(context, frame.theme) {
            lines.extend(line.wrapped(context.content_columns as usize));
        }
        let max_rows = context.content_rows as usize;
        if lines.len() > max_rows {
            tracing::debug!("truncating slide with {} lines to {max_rows}", lines.len());
            lines.truncate(max_rows);
        }
        lines
    }

    fn draw_footer(&mut self, frame: &Frame, context: &ViewerContext) -> Result<(), RenderError> {
        let columns = context.window.columns as usize;
        let row = context.window.rows.saturating_sub(1);
        let position = format!("{} / {}", frame.footer.current_slide + 1, frame.footer.total_slides);
        let style = frame.theme.footer.merged(&TextStyle::colored(frame.theme.default_colors));

        let hints = Line::from(frame.footer.hints).truncated(columns.saturating_sub(position.width() + 3));
        self.terminal.execute(&TerminalCommand::MoveTo { column: 1, row })?;
        self.terminal.execute(&TerminalCommand::PrintText { content: &hints.plain_text(), style })?;

        let column = columns.saturating_sub(position.width() + 1) as u16;
        self.terminal.execute(&TerminalCommand::MoveTo { column, row })?;
        self.terminal.execute(&TerminalCommand::PrintText { content: &position, style })?;
        Ok(())
    }
}

impl<I: TerminalIo> DisplaySurface for TerminalDrawer<I> {
    fn viewer_context(&self) -> Result<ViewerContext, RenderError> {
        let window = self.window_size()?;
        let context = ViewerContext::new(window, self.options.max_columns, self.options.show_footer)
            .with_color_capability(self.color_capability);
        Ok(context)
    }

    fn mount(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let context = self.viewer_context()?.with_theme(frame.theme.name);
        let lines = self.layout(frame, &context);
        let default_style = TextStyle::colored(frame.theme.default_colors);

        let start_column = context.window.columns.saturating_sub(context.content_columns) / 2;
        let start_row = (context.content_rows as usize).saturating_sub(lines.len()) / 2;

        self.terminal.execute(&TerminalCommand::BeginUpdate)?;
        self.terminal.execute(&TerminalCommand::SetColors(frame.theme.default_colors))?;
        self.terminal.execute(&TerminalCommand::ClearScreen)?;
        for (index, line) in lines.iter().enumerate() {
            let row = (start_row + index) as u16;
            self.terminal.execute(&TerminalCommand::MoveTo { column: start_column, row })?;
            for text in &line.0 {
                let style = text.style.merged(&default_style);
                self.terminal.execute(&TerminalCommand::PrintText { content: &text.content, style })?;
            }
        }
        if self.options.show_footer {
            self.draw_footer(frame, &context)?;
        }
        self.terminal.execute(&TerminalCommand::EndUpdate)?;
        self.terminal.execute(&TerminalCommand::Flush)?;
        Ok(())
    }

    fn suspend(&mut self) {
        self.terminal.suspend();
    }

    fn resume(&mut self) {
        self.terminal.resume();
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.terminal.execute(&TerminalCommand::ClearScreen)?;
        self.terminal.execute(&TerminalCommand::MoveTo { column: 0, row: 0 })?;
        self.terminal.execute(&TerminalCommand::Flush)?;
        Ok(())
    }
}
