use crate::{
    markdown::{
        elements::{Line, Text},
        parse::MarkdownParser,
    },
    render::properties::ViewerContext,
    terminal::ansi::AnsiParser,
    theme::PresentationTheme,
};
use std::{fmt, rc::Rc};

/// Something that knows how to turn itself into lines of text.
pub(crate) trait Renderable {
    fn render_lines(&self, context: &ViewerContext, theme: &PresentationTheme) -> Vec<Line>;
}

/// The content a slide wants displayed.
#[derive(Clone)]
pub(crate) enum DisplayPayload {
    /// Markdown text.
    FormattedText(String),

    /// Text that may contain ANSI escape codes.
    RawAnsiText(String),

    /// A title shown on top of another payload.
    Composite { title: String, body: Box<DisplayPayload> },

    /// Anything else.
    Opaque(Rc<dyn Renderable>),
}

impl DisplayPayload {
    pub(crate) fn lines(&self, context: &ViewerContext, theme: &PresentationTheme) -> Vec<Line> {
        match self {
            Self::FormattedText(text) => MarkdownParser::new(theme, context.content_columns).parse(text),
            Self::RawAnsiText(text) => AnsiParser::new(Default::default()).parse_text(text),
            Self::Composite { title, body } => {
                let mut lines = vec![Line::from(Text::new(title.clone(), theme.title)), Line::default()];
                lines.extend(body.lines(context, theme));
                lines
            }
            Self::Opaque(renderable) => renderable.render_lines(context, theme),
        }
    }
}

impl fmt::Debug for DisplayPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormattedText(text) => f.debug_tuple("FormattedText").field(text).finish(),
            Self::RawAnsiText(text) => f.debug_tuple("RawAnsiText").field(text).finish(),
            Self::Composite { title, body } => {
                f.debug_struct("Composite").field("title", title).field("body", body).finish()
            }
            Self::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

impl PartialEq for DisplayPayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::FormattedText(a), Self::FormattedText(b)) => a == b,
            (Self::RawAnsiText(a), Self::RawAnsiText(b)) => a == b,
            (Self::Composite { title: t1, body: b1 }, Self::Composite { title: t2, body: b2 }) => t1 == t2 && b1 == b2,
            (Self::Opaque(a), Self::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
