use crate::{
    markdown::{
        elements::{Line, Text},
        text_style::{Color, TextStyle},
    },
    render::{
        payload::{DisplayPayload, Renderable},
        properties::{ColorCapability, ViewerContext},
    },
    theme::{PresentationTheme, ThemeName},
};
use std::{collections::HashMap, fmt, fmt::Write, rc::Rc};

/// What a slide function produces.
pub(crate) enum FunctionOutput {
    Markdown(String),
    Ansi(String),
    Payload(DisplayPayload),
}

pub(crate) type SlideFunction = Rc<dyn Fn(&ViewerContext) -> FunctionOutput>;

/// A slide whose contents are generated by a function every time it's shown.
#[derive(Clone)]
pub(crate) struct FuncSlide {
    name: String,
    function: SlideFunction,
}

impl FuncSlide {
    pub(crate) fn new<S: Into<String>>(name: S, function: SlideFunction) -> Self {
        Self { name: name.into(), function }
    }

    pub(crate) fn render(&self, context: &ViewerContext) -> DisplayPayload {
        match (self.function)(context) {
            FunctionOutput::Markdown(text) => DisplayPayload::FormattedText(text),
            FunctionOutput::Ansi(text) => DisplayPayload::RawAnsiText(text),
            FunctionOutput::Payload(payload) => payload,
        }
    }
}

impl fmt::Debug for FuncSlide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncSlide").field("name", &self.name).finish()
    }
}

/// The functions slides can be built from, by name.
pub(crate) struct FunctionRegistry {
    functions: HashMap<String, SlideFunction>,
}

impl FunctionRegistry {
    pub(crate) fn register<S, F>(&mut self, name: S, function: F)
    where
        S: Into<String>,
        F: Fn(&ViewerContext) -> FunctionOutput + 'static,
    {
        self.functions.insert(name.into(), Rc::new(function));
    }

    pub(crate) fn get(&self, name: &str) -> Option<SlideFunction> {
        self.functions.get(name).cloned()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = Self { functions: HashMap::new() };
        registry.register("terminal-size", terminal_size);
        registry.register("colours", |_: &ViewerContext| {
            FunctionOutput::Payload(DisplayPayload::Opaque(Rc::new(ColourChart)))
        });
        registry.register("palette", palette);
        registry
    }
}

fn terminal_size(context: &ViewerContext) -> FunctionOutput {
    let window = &context.window;
    let colors = match context.color_capability {
        ColorCapability::TrueColor => "true color",
        ColorCapability::Ansi256 => "256 colors",
        ColorCapability::Basic => "16 colors",
    };
    let theme = match context.theme {
        ThemeName::Dark => "dark",
        ThemeName::Light => "light",
    };
    let text = format!(
        "# Terminal size\n\n\
         * window: **{}x{}** cells\n\
         * content area: **{}x{}** cells\n\
         * pixels: **{}x{}**\n\
         * colors: **{colors}**\n\
         * theme: **{theme}**\n",
        window.columns, window.rows, context.content_columns, context.content_rows, window.width, window.height,
    );
    FunctionOutput::Markdown(text)
}

/// The 256 xterm colors as a 16x16 grid of escape sequences.
fn palette(_: &ViewerContext) -> FunctionOutput {
    let mut text = String::new();
    for high in 0..16 {
        for low in 0..16 {
            let _ = write!(text, "\x1b[38;5;{}m██\x1b[0m", high * 16 + low);
        }
        text.push('\n');
    }
    FunctionOutput::Ansi(text)
}

/// A chart with as many colors as the terminal can show.
struct ColourChart;

impl ColourChart {
    fn swatch(color: Color) -> Text {
        Text::new("  ", TextStyle::default().bg_color(color))
    }

    fn standard() -> Vec<Line> {
        (0..2)
            .map(|row| Line((0..8).map(|column| Self::swatch(Color::from_xterm_index(row * 8 + column))).collect()))
            .collect()
    }

    fn cube(width: usize) -> Vec<Line> {
        let per_row = (width / 2).clamp(1, 36);
        let colors: Vec<_> = (16..=231).map(Color::from_xterm_index).collect();
        colors.chunks(per_row).map(|chunk| Line(chunk.iter().copied().map(Self::swatch).collect())).collect()
    }

    fn gradient(width: usize) -> Vec<Line> {
        let steps = width.max(2);
        let mut lines = Vec::new();
        for channel in 0..3 {
            let mut texts = Vec::new();
            for step in 0..steps {
                let value = (step * 255 / (steps - 1)) as u8;
                let color = match channel {
                    0 => Color::new(value, 0, 0),
                    1 => Color::new(0, value, 0),
                    _ => Color::new(0, 0, value),
                };
                texts.push(Text::new(" ", TextStyle::default().bg_color(color)));
            }
            lines.push(Line(texts));
        }
        lines
    }
}

impl Renderable for ColourChart {
    fn render_lines(&self, context: &ViewerContext, theme: &PresentationTheme) -> Vec<Line> {
        let width = context.content_columns as usize;
        let mut lines = vec![Line::from(Text::new("Colours", theme.heading(1))), Line::default()];
        lines.extend(Self::standard());
        if context.color_capability >= ColorCapability::Ansi256 {
            lines.push(Line::default());
            lines.extend(Self::cube(width));
        }
        if context.color_capability >= ColorCapability::TrueColor {
            lines.push(Line::default());
            lines.extend(Self::gradient(width));
        }
        lines
    }
}
