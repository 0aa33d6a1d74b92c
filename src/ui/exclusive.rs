use crate::{
    code::sandbox::ExecutionSandbox,
    render::{draw::DisplaySurface, properties::ViewerContext},
    slide::CodeSlide,
};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal,
};
use std::io::{self, Write};

/// Something that can block until a key is pressed.
pub(crate) trait KeypressSource {
    fn wait_for_key(&mut self) -> io::Result<()>;
}

impl<K: KeypressSource + ?Sized> KeypressSource for Box<K> {
    fn wait_for_key(&mut self) -> io::Result<()> {
        (**self).wait_for_key()
    }
}

/// Something that can switch the terminal's raw mode on and off.
pub(crate) trait RawModeToggle {
    fn is_raw_mode_enabled(&self) -> io::Result<bool>;

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()>;
}

/// The real terminal's raw mode.
pub(crate) struct TerminalRawMode;

impl RawModeToggle for TerminalRawMode {
    fn is_raw_mode_enabled(&self) -> io::Result<bool> {
        terminal::is_raw_mode_enabled()
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        if enabled { terminal::enable_raw_mode() } else { terminal::disable_raw_mode() }
    }
}

/// Enables raw mode for as long as it's alive, putting the terminal back the way it was afterwards.
pub(crate) struct RawModeGuard<'a, M: RawModeToggle> {
    mode: &'a mut M,
    was_enabled: bool,
}

impl<'a, M: RawModeToggle> RawModeGuard<'a, M> {
    pub(crate) fn new(mode: &'a mut M) -> io::Result<Self> {
        let was_enabled = mode.is_raw_mode_enabled()?;
        if !was_enabled {
            mode.set_raw_mode(true)?;
        }
        Ok(Self { mode, was_enabled })
    }
}

impl<M: RawModeToggle> Drop for RawModeGuard<'_, M> {
    fn drop(&mut self) {
        if !self.was_enabled {
            if let Err(e) = self.mode.set_raw_mode(false) {
                tracing::warn!("failed to disable raw mode: {e}");
            }
        }
    }
}

type ReadEvent = fn() -> io::Result<Event>;

/// Waits for key presses on the terminal.
pub(crate) struct TerminalKeypress<M = TerminalRawMode, R = ReadEvent> {
    mode: M,
    read: R,
}

impl TerminalKeypress {
    pub(crate) fn terminal() -> Self {
        Self { mode: TerminalRawMode, read: event::read }
    }
}

impl<M, R> KeypressSource for TerminalKeypress<M, R>
where
    M: RawModeToggle,
    R: FnMut() -> io::Result<Event>,
{
    fn wait_for_key(&mut self) -> io::Result<()> {
        let _guard = RawModeGuard::new(&mut self.mode)?;
        loop {
            if let Event::Key(key) = (self.read)()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }
}

/// Runs code slides that need the whole terminal.
///
/// The display surface is handed over to the snippet while it runs, and taken back once it's
/// done and, optionally, a key has been pressed.
pub(crate) struct AlternateScreenRunner<K, W> {
    keys: K,
    output: W,
}

/// A runner that doesn't care where its input comes from or where its output goes.
pub(crate) type DynAlternateScreenRunner = AlternateScreenRunner<Box<dyn KeypressSource>, Box<dyn Write>>;

impl DynAlternateScreenRunner {
    /// A runner that uses the real terminal.
    pub(crate) fn terminal() -> Self {
        Self::new(Box::new(TerminalKeypress::terminal()), Box::new(io::stdout()))
    }
}

impl<K: KeypressSource, W: Write> AlternateScreenRunner<K, W> {
    pub(crate) fn new(keys: K, output: W) -> Self {
        Self { keys, output }
    }

    /// Run a slide's code and put the slide back to showing its source.
    pub(crate) fn run<S: DisplaySurface>(
        &mut self,
        slide: &mut CodeSlide,
        context: &ViewerContext,
        sandbox: &ExecutionSandbox,
        surface: &mut S,
    ) {
        tracing::info!("running {} snippet in exclusive screen", slide.snippet().language);
        surface.suspend();
        if let Err(e) = surface.clear() {
            tracing::warn!("failed to clear terminal: {e}");
        }
        if let Some(fault) = sandbox.execute_inherited(&slide.snippet(), context) {
            if let Err(e) = writeln!(self.output, "Error: {fault}").and_then(|_| self.output.flush()) {
                tracing::warn!("failed to print execution error: {e}");
            }
        }
        if slide.waits_for_key() {
            if let Err(e) = self.keys.wait_for_key() {
                tracing::warn!("failed waiting for key press: {e}");
            }
        }
        slide.show_source();
        if let Err(e) = surface.clear() {
            tracing::warn!("failed to clear terminal: {e}");
        }
        surface.resume();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        code::{execute::FnExecutor, snippet::SnippetLanguage},
        config::CommandOutput,
        render::{RenderError, draw::Frame, properties::WindowSize},
        slide::{DisplayMode, source::SourceText},
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rstest::rstest;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct RecordingSurface {
        events: Vec<&'static str>,
    }

    impl DisplaySurface for RecordingSurface {
        fn viewer_context(&self) -> Result<ViewerContext, RenderError> {
            Ok(context())
        }

        fn mount(&mut self, _frame: &Frame) -> Result<(), RenderError> {
            self.events.push("mount");
            Ok(())
        }

        fn suspend(&mut self) {
            self.events.push("suspend");
        }

        fn resume(&mut self) {
            self.events.push("resume");
        }

        fn clear(&mut self) -> Result<(), RenderError> {
            self.events.push("clear");
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingKeys {
        presses: Rc<RefCell<usize>>,
        fail: bool,
    }

    impl KeypressSource for CountingKeys {
        fn wait_for_key(&mut self) -> io::Result<()> {
            *self.presses.borrow_mut() += 1;
            if self.fail { Err(io::Error::other("no keyboard")) } else { Ok(()) }
        }
    }

    fn context() -> ViewerContext {
        ViewerContext::new(WindowSize { rows: 24, columns: 80, width: 0, height: 0 }, u16::MAX, true)
    }

    fn sandbox() -> ExecutionSandbox {
        let mut executor = FnExecutor::default();
        executor.register(SnippetLanguage::Python, |_, _| Ok(String::new()));
        executor.register(SnippetLanguage::Ruby, |_, _| Err("boom".into()));
        executor.register(SnippetLanguage::Lua, |_, _| panic!("kaboom"));
        ExecutionSandbox::new(Rc::new(executor), CommandOutput::Discard)
    }

    fn slide(language: SnippetLanguage, wait_for_key: bool) -> CodeSlide {
        CodeSlide::new(SourceText::from_text("top"), language)
            .exclusive(true)
            .wait_for_key(wait_for_key)
            .with_mode(DisplayMode::Output)
    }

    #[test]
    fn hands_over_terminal_and_takes_it_back() {
        let keys = CountingKeys::default();
        let mut runner = AlternateScreenRunner::new(keys.clone(), Vec::new());
        let mut surface = RecordingSurface::default();
        let mut slide = slide(SnippetLanguage::Python, true);
        runner.run(&mut slide, &context(), &sandbox(), &mut surface);

        assert_eq!(surface.events, &["suspend", "clear", "clear", "resume"]);
        assert_eq!(*keys.presses.borrow(), 1);
        assert_eq!(slide.mode(), DisplayMode::Source);
        assert!(runner.output.is_empty());
    }

    #[test]
    fn no_wait() {
        let keys = CountingKeys::default();
        let mut runner = AlternateScreenRunner::new(keys.clone(), Vec::new());
        let mut slide = slide(SnippetLanguage::Python, false);
        runner.run(&mut slide, &context(), &sandbox(), &mut RecordingSurface::default());
        assert_eq!(*keys.presses.borrow(), 0);
        assert_eq!(slide.mode(), DisplayMode::Source);
    }

    #[test]
    fn fault_printed_and_surface_restored() {
        let keys = CountingKeys::default();
        let mut runner = AlternateScreenRunner::new(keys.clone(), Vec::new());
        let mut surface = RecordingSurface::default();
        let mut slide = slide(SnippetLanguage::Ruby, true);
        runner.run(&mut slide, &context(), &sandbox(), &mut surface);

        assert_eq!(String::from_utf8_lossy(&runner.output), "Error: boom\n");
        assert_eq!(surface.events.last(), Some(&"resume"));
        assert_eq!(*keys.presses.borrow(), 1);
        assert_eq!(slide.mode(), DisplayMode::Source);
    }

    #[test]
    fn panic_recovered() {
        let mut runner = AlternateScreenRunner::new(CountingKeys::default(), Vec::new());
        let mut surface = RecordingSurface::default();
        let mut slide = slide(SnippetLanguage::Lua, false);
        runner.run(&mut slide, &context(), &sandbox(), &mut surface);

        assert_eq!(String::from_utf8_lossy(&runner.output), "Error: kaboom\n");
        assert_eq!(surface.events.last(), Some(&"resume"));
    }

    #[test]
    fn key_failure_still_restores() {
        let keys = CountingKeys { fail: true, ..Default::default() };
        let mut runner = AlternateScreenRunner::new(keys, Vec::new());
        let mut surface = RecordingSurface::default();
        let mut slide = slide(SnippetLanguage::Python, true);
        runner.run(&mut slide, &context(), &sandbox(), &mut surface);
        assert_eq!(surface.events.last(), Some(&"resume"));
        assert_eq!(slide.mode(), DisplayMode::Source);
    }

    #[derive(Default)]
    struct FakeRawMode {
        enabled: bool,
        changes: Vec<bool>,
    }

    impl RawModeToggle for FakeRawMode {
        fn is_raw_mode_enabled(&self) -> io::Result<bool> {
            Ok(self.enabled)
        }

        fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
            self.enabled = enabled;
            self.changes.push(enabled);
            Ok(())
        }
    }

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(KeyCode::Char('a'), KeyModifiers::NONE, kind))
    }

    #[test]
    fn raw_mode_restored_after_key() {
        let mut events = vec![Ok(key(KeyEventKind::Release)), Ok(Event::FocusGained), Ok(key(KeyEventKind::Press))];
        events.reverse();
        let mut keys =
            TerminalKeypress { mode: FakeRawMode::default(), read: move || events.pop().expect("no more events") };
        keys.wait_for_key().expect("wait failed");
        assert_eq!(keys.mode.changes, &[true, false]);
        assert!(!keys.mode.enabled);
    }

    #[test]
    fn raw_mode_restored_after_read_error() {
        let read = || -> io::Result<Event> { Err(io::Error::other("stdin closed")) };
        let mut keys = TerminalKeypress { mode: FakeRawMode::default(), read };
        assert!(keys.wait_for_key().is_err());
        assert_eq!(keys.mode.changes, &[true, false]);
        assert!(!keys.mode.enabled);
    }

    #[rstest]
    #[case::key(true)]
    #[case::error(false)]
    fn raw_mode_left_enabled(#[case] succeed: bool) {
        let mode = FakeRawMode { enabled: true, changes: Vec::new() };
        let read = move || {
            if succeed { Ok(key(KeyEventKind::Press)) } else { Err(io::Error::other("stdin closed")) }
        };
        let mut keys = TerminalKeypress { mode, read };
        assert_eq!(keys.wait_for_key().is_ok(), succeed);
        assert!(keys.mode.changes.is_empty());
        assert!(keys.mode.enabled);
    }
}
