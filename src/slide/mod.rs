//! Slides and the way they're turned into something that can be displayed.

pub(crate) mod func;
pub(crate) mod source;

use crate::{
    code::{
        execute::ExecutionBindings,
        sandbox::ExecutionSandbox,
        snippet::{Snippet, SnippetLanguage},
    },
    render::{payload::DisplayPayload, properties::ViewerContext},
};
use func::FuncSlide;
use serde::Deserialize;
use source::{SourceLoadError, SourceText};
use std::path::Path;

/// The way a slide is being shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DisplayMode {
    /// The slide's source.
    #[default]
    #[serde(alias = "code")]
    Source,

    /// The output of running the slide's source.
    Output,
}

impl DisplayMode {
    fn flipped(self) -> Self {
        match self {
            Self::Source => Self::Output,
            Self::Output => Self::Source,
        }
    }
}

/// The result of toggling a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToggleOutcome {
    /// The slide is now in this mode.
    Toggled(DisplayMode),

    /// The slide can't be run so nothing changed.
    NotRunnable,
}

#[derive(Debug)]
pub(crate) enum Slide {
    Markdown(MarkdownSlide),
    Code(CodeSlide),
    Func(FuncSlide),
}

impl Slide {
    /// Turn this slide into something that can be displayed.
    ///
    /// This runs code if this is a code slide showing its output.
    pub(crate) fn render(&mut self, context: &ViewerContext, sandbox: &ExecutionSandbox) -> DisplayPayload {
        match self {
            Self::Markdown(slide) => slide.render(),
            Self::Code(slide) => slide.render(context, sandbox),
            Self::Func(slide) => slide.render(context),
        }
    }

    /// Read this slide's contents again from disk.
    pub(crate) fn reload(&mut self) -> Result<(), SourceLoadError> {
        match self {
            Self::Markdown(slide) => slide.source.reload(),
            Self::Code(slide) => slide.reload(),
            Self::Func(_) => Ok(()),
        }
    }

    pub(crate) fn is_executable(&self) -> bool {
        matches!(self, Self::Code(_))
    }

    pub(crate) fn toggle(&mut self) -> ToggleOutcome {
        match self {
            Self::Code(slide) => ToggleOutcome::Toggled(slide.toggle()),
            Self::Markdown(_) | Self::Func(_) => ToggleOutcome::NotRunnable,
        }
    }

    pub(crate) fn display_mode(&self) -> DisplayMode {
        match self {
            Self::Code(slide) => slide.mode(),
            Self::Markdown(_) | Self::Func(_) => DisplayMode::Source,
        }
    }

    /// The file this slide was loaded from.
    pub(crate) fn identity(&self) -> Option<&Path> {
        match self {
            Self::Markdown(slide) => slide.source.identity(),
            Self::Code(slide) => slide.source.identity(),
            Self::Func(_) => None,
        }
    }

    /// Whether this slide needs the whole terminal for itself the next time it's shown.
    pub(crate) fn needs_exclusive_screen(&self) -> bool {
        match self {
            Self::Code(slide) => slide.exclusive && slide.mode == DisplayMode::Output,
            Self::Markdown(_) | Self::Func(_) => false,
        }
    }
}

impl From<MarkdownSlide> for Slide {
    fn from(slide: MarkdownSlide) -> Self {
        Self::Markdown(slide)
    }
}

impl From<CodeSlide> for Slide {
    fn from(slide: CodeSlide) -> Self {
        Self::Code(slide)
    }
}

impl From<FuncSlide> for Slide {
    fn from(slide: FuncSlide) -> Self {
        Self::Func(slide)
    }
}

/// A slide made of markdown text.
#[derive(Debug)]
pub(crate) struct MarkdownSlide {
    source: SourceText,
}

impl MarkdownSlide {
    pub(crate) fn new(source: SourceText) -> Self {
        Self { source }
    }

    fn render(&self) -> DisplayPayload {
        DisplayPayload::FormattedText(self.source.content().to_string())
    }
}

/// When a code slide runs its code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Refresh {
    /// Run once and reuse the output for as long as the viewer doesn't change.
    #[default]
    Cached,

    /// Run every time the slide is shown.
    EveryRender,
}

#[derive(Debug)]
struct CachedOutput {
    bindings: ExecutionBindings,
    output: String,
}

/// A slide containing code that can be run.
#[derive(Debug)]
pub(crate) struct CodeSlide {
    source: SourceText,
    language: SnippetLanguage,
    mode: DisplayMode,
    exclusive: bool,
    wait_for_key: bool,
    title: Option<String>,
    refresh: Refresh,
    cache: Option<CachedOutput>,
}

impl CodeSlide {
    pub(crate) fn new(source: SourceText, language: SnippetLanguage) -> Self {
        Self {
            source,
            language,
            mode: DisplayMode::Source,
            exclusive: false,
            wait_for_key: true,
            title: None,
            refresh: Refresh::Cached,
            cache: None,
        }
    }

    /// A slide that shows its code's output by default and runs it every time it's shown.
    pub(crate) fn dynamic(source: SourceText, language: SnippetLanguage) -> Self {
        Self { mode: DisplayMode::Output, refresh: Refresh::EveryRender, ..Self::new(source, language) }
    }

    /// Run this slide's code with the terminal all to itself.
    pub(crate) fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Wait for a key press after running in an exclusive screen.
    pub(crate) fn wait_for_key(mut self, wait: bool) -> Self {
        self.wait_for_key = wait;
        self
    }

    pub(crate) fn title<S: Into<String>>(mut self, title: Option<S>) -> Self {
        self.title = title.map(Into::into);
        self
    }

    pub(crate) fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn snippet(&self) -> Snippet {
        Snippet::new(self.source.content(), self.language.clone())
    }

    pub(crate) fn language(&self) -> &SnippetLanguage {
        &self.language
    }

    pub(crate) fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub(crate) fn waits_for_key(&self) -> bool {
        self.wait_for_key
    }

    pub(crate) fn toggle(&mut self) -> DisplayMode {
        self.mode = self.mode.flipped();
        if self.mode == DisplayMode::Source {
            self.cache = None;
        }
        self.mode
    }

    /// Go back to showing the source.
    pub(crate) fn show_source(&mut self) {
        self.mode = DisplayMode::Source;
        self.cache = None;
    }

    pub(crate) fn reload(&mut self) -> Result<(), SourceLoadError> {
        self.source.reload()?;
        self.cache = None;
        Ok(())
    }

    /// The source as markdown, hidden lines excluded.
    pub(crate) fn source_payload(&self, sandbox: &ExecutionSandbox) -> DisplayPayload {
        let snippet = self.snippet();
        let visible = snippet.visible_lines(sandbox.hidden_line_marker(&self.language));
        let code = visible.join("\n");
        let fence = "`".repeat(longest_backtick_run(&code).max(2) + 1);
        let body = DisplayPayload::FormattedText(format!("{fence}{}\n{code}\n{fence}", self.language));
        self.with_title(body)
    }

    fn render(&mut self, context: &ViewerContext, sandbox: &ExecutionSandbox) -> DisplayPayload {
        if self.mode == DisplayMode::Source || self.exclusive {
            return self.source_payload(sandbox);
        }
        let bindings = ExecutionBindings { width: context.content_columns, height: context.content_rows };
        let output = match (&self.cache, self.refresh) {
            (Some(cached), Refresh::Cached) if cached.bindings == bindings => cached.output.clone(),
            _ => {
                let execution = sandbox.execute(&self.snippet(), context);
                if self.refresh == Refresh::Cached && execution.fault.is_none() {
                    self.cache = Some(CachedOutput { bindings, output: execution.output.clone() });
                }
                execution.output
            }
        };
        self.with_title(DisplayPayload::RawAnsiText(output))
    }

    fn with_title(&self, body: DisplayPayload) -> DisplayPayload {
        match &self.title {
            Some(title) => DisplayPayload::Composite { title: title.clone(), body: Box::new(body) },
            None => body,
        }
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{code::execute::FnExecutor, config::CommandOutput, render::properties::WindowSize};
    use std::{cell::Cell, fs, rc::Rc};
    use tempfile::tempdir;

    fn context(columns: u16) -> ViewerContext {
        ViewerContext::new(WindowSize { rows: 24, columns, width: 0, height: 0 }, u16::MAX, true)
    }

    fn counting_sandbox() -> (ExecutionSandbox, Rc<Cell<usize>>) {
        let runs = Rc::new(Cell::new(0));
        let mut executor = FnExecutor::default();
        let counter = runs.clone();
        executor.register(SnippetLanguage::Python, move |contents, bindings| {
            counter.set(counter.get() + 1);
            Ok(format!("{contents} @ {}", bindings.width))
        });
        (ExecutionSandbox::new(Rc::new(executor), CommandOutput::Discard), runs)
    }

    fn code_slide(contents: &str) -> Slide {
        CodeSlide::new(SourceText::from_text(contents), SnippetLanguage::Python).into()
    }

    #[test]
    fn markdown_slide() {
        let (sandbox, _) = counting_sandbox();
        let mut slide: Slide = MarkdownSlide::new(SourceText::from_text("# A")).into();
        assert!(!slide.is_executable());
        assert_eq!(slide.render(&context(80), &sandbox), DisplayPayload::FormattedText("# A".into()));
        assert_eq!(slide.toggle(), ToggleOutcome::NotRunnable);
        assert_eq!(slide.display_mode(), DisplayMode::Source);
    }

    #[test]
    fn toggle_twice_restores_mode() {
        let mut slide = code_slide("x");
        assert!(slide.is_executable());
        assert_eq!(slide.toggle(), ToggleOutcome::Toggled(DisplayMode::Output));
        assert_eq!(slide.toggle(), ToggleOutcome::Toggled(DisplayMode::Source));
        assert_eq!(slide.display_mode(), DisplayMode::Source);
    }

    #[test]
    fn source_mode_does_not_execute() {
        let (sandbox, runs) = counting_sandbox();
        let mut slide = code_slide("print('x')");
        let payload = slide.render(&context(80), &sandbox);
        assert_eq!(payload, DisplayPayload::FormattedText("```python\nprint('x')\n```".into()));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn output_cached_per_dimensions() {
        let (sandbox, runs) = counting_sandbox();
        let mut slide = code_slide("x");
        slide.toggle();
        assert_eq!(slide.render(&context(80), &sandbox), DisplayPayload::RawAnsiText("x @ 76".into()));
        slide.render(&context(80), &sandbox);
        assert_eq!(runs.get(), 1);

        assert_eq!(slide.render(&context(60), &sandbox), DisplayPayload::RawAnsiText("x @ 56".into()));
        assert_eq!(runs.get(), 2);

        // going back to the source drops the output
        slide.toggle();
        slide.toggle();
        slide.render(&context(60), &sandbox);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let mut executor = FnExecutor::default();
        executor.register(SnippetLanguage::Python, move |_, _| {
            counter.set(counter.get() + 1);
            Err("boom".into())
        });
        let sandbox = ExecutionSandbox::new(Rc::new(executor), CommandOutput::Discard);
        let mut slide = code_slide("x");
        slide.toggle();
        let DisplayPayload::RawAnsiText(output) = slide.render(&context(80), &sandbox) else {
            panic!("not raw text");
        };
        assert!(output.starts_with("Error: "));
        slide.render(&context(80), &sandbox);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn dynamic_runs_every_time() {
        let (sandbox, runs) = counting_sandbox();
        let mut slide: Slide = CodeSlide::dynamic(SourceText::from_text("x"), SnippetLanguage::Python).into();
        assert_eq!(slide.display_mode(), DisplayMode::Output);
        slide.render(&context(80), &sandbox);
        slide.render(&context(80), &sandbox);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn title() {
        let (sandbox, _) = counting_sandbox();
        let mut slide: Slide =
            CodeSlide::new(SourceText::from_text("x"), SnippetLanguage::Python).title(Some("Demo")).into();
        slide.toggle();
        let expected = DisplayPayload::Composite {
            title: "Demo".into(),
            body: Box::new(DisplayPayload::RawAnsiText("x @ 76".into())),
        };
        assert_eq!(slide.render(&context(80), &sandbox), expected);
    }

    #[test]
    fn exclusive_slides_need_exclusive_screen_only_when_running() {
        let mut slide: Slide =
            CodeSlide::new(SourceText::from_text("x"), SnippetLanguage::Python).exclusive(true).into();
        assert!(!slide.needs_exclusive_screen());
        slide.toggle();
        assert!(slide.needs_exclusive_screen());
    }

    #[test]
    fn hidden_lines_not_shown() {
        let (sandbox, _) = counting_sandbox();
        let slide = CodeSlide::new(SourceText::from_text("import os # HIDE\nprint(os.name)"), SnippetLanguage::Python);
        let expected = DisplayPayload::FormattedText("```python\nprint(os.name)\n```".into());
        assert_eq!(slide.source_payload(&sandbox), expected);
    }

    #[test]
    fn backticks_in_code() {
        let (sandbox, _) = counting_sandbox();
        let slide = CodeSlide::new(SourceText::from_text("echo ````"), SnippetLanguage::Bash);
        assert_eq!(slide.source_payload(&sandbox), DisplayPayload::FormattedText("`````bash\necho ````\n`````".into()));
    }

    #[test]
    fn reload_keeps_mode_and_drops_output() {
        let dir = tempdir().expect("no tempdir");
        let path = dir.path().join("slide.py");
        fs::write(&path, "one").expect("write failed");
        let (sandbox, _) = counting_sandbox();
        let source = SourceText::from_path(&path).expect("load failed");
        let mut slide: Slide = CodeSlide::new(source, SnippetLanguage::Python).into();
        slide.toggle();
        assert_eq!(slide.render(&context(80), &sandbox), DisplayPayload::RawAnsiText("one @ 76".into()));

        fs::write(&path, "two").expect("write failed");
        slide.reload().expect("reload failed");
        assert_eq!(slide.display_mode(), DisplayMode::Output);
        assert_eq!(slide.render(&context(80), &sandbox), DisplayPayload::RawAnsiText("two @ 76".into()));
    }
}
