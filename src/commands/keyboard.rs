use super::listener::{Command, CommandDiscriminants};
use crate::config::KeyBindingsConfig;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};
use std::{fmt, io, iter, mem, str::FromStr, time::Duration};

/// A keyboard command listener.
pub(crate) struct KeyboardListener {
    bindings: CommandKeyBindings,
    events: Vec<KeyEvent>,
}

impl KeyboardListener {
    pub(crate) fn new(bindings: CommandKeyBindings) -> Self {
        Self { bindings, events: Vec::new() }
    }

    pub(crate) fn bindings(&self) -> &CommandKeyBindings {
        &self.bindings
    }

    /// Polls for the next input command coming from the keyboard.
    pub(crate) fn poll_next_command(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if poll(timeout)? { self.next_command() } else { Ok(None) }
    }

    fn next_command(&mut self) -> io::Result<Option<Command>> {
        let event = read()?;
        Ok(self.process_event(event))
    }

    fn process_event(&mut self, event: Event) -> Option<Command> {
        let mut events = mem::take(&mut self.events);
        let (command, events) = match event {
            // Ignore release events
            Event::Key(event) if event.kind == KeyEventKind::Release => (None, events),
            Event::Key(event) => {
                events.push(event);
                match self.bindings.apply(&events) {
                    InputAction::Emit(command) => (Some(command), Vec::new()),
                    InputAction::Buffer => (None, events),
                    InputAction::Reset => (None, Vec::new()),
                }
            }
            Event::Resize(..) => (Some(Command::Redraw), events),
            _ => (None, Vec::new()),
        };
        self.events = events;
        command
    }
}

enum InputAction {
    Buffer,
    Reset,
    Emit(Command),
}

/// The key bindings for every command.
pub(crate) struct CommandKeyBindings {
    bindings: Vec<(KeyBinding, CommandDiscriminants)>,
}

impl CommandKeyBindings {
    fn apply(&self, events: &[KeyEvent]) -> InputAction {
        let mut any_partials = false;
        for (binding, command) in &self.bindings {
            match binding.match_events(events) {
                BindingMatch::Full => return InputAction::Emit(Self::instantiate(*command)),
                BindingMatch::Partial => any_partials = true,
                BindingMatch::None => (),
            }
        }
        if any_partials { InputAction::Buffer } else { InputAction::Reset }
    }

    fn instantiate(discriminant: CommandDiscriminants) -> Command {
        use CommandDiscriminants::*;
        match discriminant {
            Redraw => Command::Redraw,
            Next => Command::Next,
            Previous => Command::Previous,
            FirstSlide => Command::FirstSlide,
            LastSlide => Command::LastSlide,
            ToggleRun => Command::ToggleRun,
            Edit => Command::Edit,
            Reload => Command::Reload,
            ToggleTheme => Command::ToggleTheme,
            Exit => Command::Exit,
        }
    }

    fn first_binding(&self, command: CommandDiscriminants) -> Option<&KeyBinding> {
        self.bindings.iter().find(|(_, c)| *c == command).map(|(binding, _)| binding)
    }

    /// A short description of the most useful bindings, meant to be shown in the footer.
    pub(crate) fn footer_hints(&self) -> String {
        use CommandDiscriminants::*;
        let hints = [(Next, "next"), (Previous, "prev"), (ToggleRun, "run"), (Edit, "edit"), (Exit, "quit")];
        let hints: Vec<_> = hints
            .into_iter()
            .filter_map(|(command, label)| self.first_binding(command).map(|binding| format!("{binding} {label}")))
            .collect();
        hints.join("  ")
    }

    fn validate_conflicts<'a>(
        bindings: impl Iterator<Item = &'a KeyBinding>,
    ) -> Result<(), KeyBindingsValidationError> {
        let bindings: Vec<_> = bindings.collect();
        for (index, first) in bindings.iter().enumerate() {
            for second in &bindings[index + 1..] {
                if first.is_prefix_of(second) || second.is_prefix_of(first) {
                    return Err(KeyBindingsValidationError::Conflict((*first).clone(), (*second).clone()));
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<KeyBindingsConfig> for CommandKeyBindings {
    type Error = KeyBindingsValidationError;

    fn try_from(config: KeyBindingsConfig) -> Result<Self, Self::Error> {
        let zip = |discriminant, bindings: Vec<KeyBinding>| bindings.into_iter().zip(iter::repeat(discriminant));
        let bindings: Vec<_> = iter::empty()
            .chain(zip(CommandDiscriminants::Next, config.next))
            .chain(zip(CommandDiscriminants::Previous, config.previous))
            .chain(zip(CommandDiscriminants::FirstSlide, config.first_slide))
            .chain(zip(CommandDiscriminants::LastSlide, config.last_slide))
            .chain(zip(CommandDiscriminants::ToggleRun, config.toggle_run))
            .chain(zip(CommandDiscriminants::Edit, config.edit))
            .chain(zip(CommandDiscriminants::Reload, config.reload))
            .chain(zip(CommandDiscriminants::ToggleTheme, config.toggle_theme))
            .chain(zip(CommandDiscriminants::Exit, config.exit))
            .collect();
        Self::validate_conflicts(bindings.iter().map(|binding| &binding.0))?;
        Ok(Self { bindings })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingsValidationError {
    #[error("conflicting keybindings: {0} and {1}")]
    Conflict(KeyBinding, KeyBinding),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BindingMatch {
    Full,
    Partial,
    None,
}

/// A sequence of keys that triggers a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding(Vec<KeyCombination>);

crate::utils::impl_deserialize_from_str!(KeyBinding);

impl KeyBinding {
    fn match_events(&self, events: &[KeyEvent]) -> BindingMatch {
        for (index, combo) in self.0.iter().enumerate() {
            let Some(event) = events.get(index) else {
                return BindingMatch::Partial;
            };
            if !combo.matches(event) {
                return BindingMatch::None;
            }
        }
        BindingMatch::Full
    }

    fn is_prefix_of(&self, other: &KeyBinding) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }
}

impl FromStr for KeyBinding {
    type Err = KeyBindingParseError;

    fn from_str(mut input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(KeyBindingParseError::NoInput);
        }
        let mut combos = Vec::new();
        while !input.is_empty() {
            let (combo, rest) = KeyCombination::parse(input)?;
            combos.push(combo);
            input = rest;
        }
        Ok(Self(combos))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for combo in &self.0 {
            write!(f, "{combo}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingParseError {
    #[error("no input")]
    NoInput,

    #[error("not a valid key: {0}")]
    InvalidKey(char),

    #[error("invalid control sequence")]
    InvalidControlSequence,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct KeyCombination {
    key: KeyCode,
    control: bool,
}

impl KeyCombination {
    fn matches(&self, event: &KeyEvent) -> bool {
        let is_control = event.modifiers == KeyModifiers::CONTROL;
        self.key == event.code && self.control == is_control
    }

    fn parse(input: &str) -> Result<(Self, &str), KeyBindingParseError> {
        if let Some(input) = try_match_input(input, &["<c-", "<C-"]) {
            let (key, input) = parse_key_code(input)?;
            let Some(input) = input.strip_prefix('>') else {
                return Err(KeyBindingParseError::InvalidControlSequence);
            };
            Ok((Self { key, control: true }, input))
        } else {
            let (key, input) = parse_key_code(input)?;
            Ok((Self { key, control: false }, input))
        }
    }
}

impl From<KeyCode> for KeyCombination {
    fn from(key: KeyCode) -> Self {
        Self { key, control: false }
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.control {
            write!(f, "<c-")?;
        }
        match self.key {
            KeyCode::Char(' ') => write!(f, "' '")?,
            KeyCode::Char(c) => write!(f, "{c}")?,
            other => write!(f, "<{other:?}>")?,
        };
        if self.control {
            write!(f, ">")?;
        }
        Ok(())
    }
}

const NAMED_KEYS: &[(&[&str], KeyCode)] = &[
    (&["<PageUp>", "<page_up>"], KeyCode::PageUp),
    (&["<PageDown>", "<page_down>"], KeyCode::PageDown),
    (&["<cr>", "<CR>", "<Enter>", "<enter>"], KeyCode::Enter),
    (&["<Home>", "<home>"], KeyCode::Home),
    (&["<End>", "<end>"], KeyCode::End),
    (&["<Left>", "<left>"], KeyCode::Left),
    (&["<Right>", "<right>"], KeyCode::Right),
    (&["<Up>", "<up>"], KeyCode::Up),
    (&["<Down>", "<down>"], KeyCode::Down),
    (&["<Esc>", "<esc>"], KeyCode::Esc),
    (&["<Tab>", "<tab>"], KeyCode::Tab),
    (&["<Backspace>", "<backspace>"], KeyCode::Backspace),
];

fn parse_key_code(input: &str) -> Result<(KeyCode, &str), KeyBindingParseError> {
    for (aliases, key) in NAMED_KEYS {
        if let Some(rest) = try_match_input(input, aliases) {
            return Ok((*key, rest));
        }
    }
    if let Some(input) = try_match_input(input, &["<F", "<f"]) {
        let (number, rest) = input.split_once('>').ok_or(KeyBindingParseError::InvalidControlSequence)?;
        let number: u8 = number.parse().map_err(|_| KeyBindingParseError::InvalidControlSequence)?;
        return match number {
            1..=12 => Ok((KeyCode::F(number), rest)),
            _ => Err(KeyBindingParseError::InvalidControlSequence),
        };
    }
    let next = input.chars().next().ok_or(KeyBindingParseError::NoInput)?;
    // don't allow these as they create ambiguity
    if next == '<' || next == '>' {
        Err(KeyBindingParseError::InvalidKey(next))
    } else if next.is_alphanumeric() || next.is_ascii_punctuation() || next == ' ' {
        Ok((KeyCode::Char(next), &input[next.len_utf8()..]))
    } else {
        Err(KeyBindingParseError::InvalidKey(next))
    }
}

fn try_match_input<'a>(input: &'a str, aliases: &[&str]) -> Option<&'a str> {
    aliases.iter().find_map(|alias| input.strip_prefix(alias))
}

#[cfg(test)]
mod test {
    use super::*;
    use crossterm::event::KeyEventState;
    use rstest::rstest;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::empty(), kind: KeyEventKind::Press, state: KeyEventState::NONE }
    }

    fn char(c: char) -> KeyEvent {
        press(KeyCode::Char(c))
    }

    fn control(c: char) -> KeyEvent {
        KeyEvent { modifiers: KeyModifiers::CONTROL, ..char(c) }
    }

    fn binding(pattern: &str) -> KeyBinding {
        KeyBinding::from_str(pattern).expect("failed to parse")
    }

    fn listener() -> KeyboardListener {
        let bindings = CommandKeyBindings::try_from(KeyBindingsConfig::default()).expect("invalid bindings");
        KeyboardListener::new(bindings)
    }

    #[rstest]
    #[case::char("w", vec![KeyCode::Char('w').into()])]
    #[case::ctrl_char1("<c-w>", vec![KeyCombination { key: KeyCode::Char('w'), control: true }])]
    #[case::ctrl_char2("<C-w>", vec![KeyCombination { key: KeyCode::Char('w'), control: true }])]
    #[case::dot(".", vec![KeyCode::Char('.').into()])]
    #[case::space(" ", vec![KeyCode::Char(' ').into()])]
    #[case::multi("gg", vec![KeyCode::Char('g').into(), KeyCode::Char('g').into()])]
    #[case::page_up("<page_up>", vec![KeyCode::PageUp.into()])]
    #[case::page_down("<PageDown>", vec![KeyCode::PageDown.into()])]
    #[case::enter("<cr>", vec![KeyCode::Enter.into()])]
    #[case::home("<home>", vec![KeyCode::Home.into()])]
    #[case::end("<End>", vec![KeyCode::End.into()])]
    #[case::arrows("<left><right>", vec![KeyCode::Left.into(), KeyCode::Right.into()])]
    #[case::f12("<f12>", vec![KeyCode::F(12).into()])]
    fn parse_key_binding(#[case] pattern: &str, #[case] combos: Vec<KeyCombination>) {
        assert_eq!(binding(pattern), KeyBinding(combos));
    }

    #[rstest]
    #[case::empty("")]
    #[case::invalid_tag("<hi>")]
    #[case::invalid_char("\u{1F680}")]
    #[case::control_sequence("<C-w")]
    #[case::f13("<f13>")]
    #[case::unfinished_f("<f1")]
    fn invalid_key_bindings(#[case] input: &str) {
        assert!(KeyBinding::from_str(input).is_err(), "not an error");
    }

    #[rstest]
    #[case::single("g", &[char('g')], BindingMatch::Full)]
    #[case::uppercase("G", &[char('G')], BindingMatch::Full)]
    #[case::multi("gg", &[char('g'), char('g')], BindingMatch::Full)]
    #[case::control("<c-e>", &[control('e')], BindingMatch::Full)]
    #[case::control_mismatch("e", &[control('e')], BindingMatch::None)]
    #[case::fewer("gg", &[char('g')], BindingMatch::Partial)]
    #[case::different("gg", &[char('g'), char('h')], BindingMatch::None)]
    fn matching(#[case] pattern: &str, #[case] events: &[KeyEvent], #[case] expected: BindingMatch) {
        assert_eq!(binding(pattern).match_events(events), expected);
    }

    #[rstest]
    #[case::same(&["q", "q"])]
    #[case::prefix(&["g", "gg"])]
    #[case::control(&["<c-w>", "<c-w>a"])]
    fn conflicts(#[case] patterns: &[&str]) {
        let bindings: Vec<_> = patterns.iter().map(|p| binding(p)).collect();
        let result = CommandKeyBindings::validate_conflicts(bindings.iter());
        assert!(result.is_err(), "not an error: {result:?}");
    }

    #[rstest]
    #[case(&["ga", "gb"])]
    #[case(&["<c-a>", "a"])]
    fn no_conflicts(#[case] patterns: &[&str]) {
        let bindings: Vec<_> = patterns.iter().map(|p| binding(p)).collect();
        let result = CommandKeyBindings::validate_conflicts(bindings.iter());
        assert!(result.is_ok(), "got error: {result:?}");
    }

    #[test]
    fn conflicting_config_rejected() {
        let config = KeyBindingsConfig { edit: vec![binding("q")], ..Default::default() };
        assert!(CommandKeyBindings::try_from(config).is_err());
    }

    #[rstest]
    #[case::next(&[char('l')], Some(Command::Next))]
    #[case::previous(&[press(KeyCode::Left)], Some(Command::Previous))]
    #[case::first(&[char('g'), char('g')], Some(Command::FirstSlide))]
    #[case::last(&[char('G')], Some(Command::LastSlide))]
    #[case::run(&[char('.')], Some(Command::ToggleRun))]
    #[case::run_control(&[control('e')], Some(Command::ToggleRun))]
    #[case::edit(&[char('e')], Some(Command::Edit))]
    #[case::reload(&[char('r')], Some(Command::Reload))]
    #[case::theme(&[char('d')], Some(Command::ToggleTheme))]
    #[case::exit(&[control('c')], Some(Command::Exit))]
    #[case::unbound(&[char('z')], None)]
    #[case::reset_after_mismatch(&[char('g'), char('z'), char('q')], Some(Command::Exit))]
    fn default_bindings(#[case] events: &[KeyEvent], #[case] expected: Option<Command>) {
        let mut listener = listener();
        let mut command = None;
        for event in events {
            command = listener.process_event(Event::Key(*event));
        }
        assert_eq!(command, expected);
    }

    #[test]
    fn resize_redraws() {
        let mut listener = listener();
        assert_eq!(listener.process_event(Event::Resize(10, 10)), Some(Command::Redraw));
    }

    #[test]
    fn release_ignored() {
        let mut listener = listener();
        let event = KeyEvent { kind: KeyEventKind::Release, ..char('q') };
        assert_eq!(listener.process_event(Event::Key(event)), None);
    }

    #[rstest]
    #[case("<PageUp>x")]
    #[case("<c-e>")]
    #[case("gg")]
    fn display(#[case] pattern: &str) {
        assert_eq!(binding(pattern).to_string(), pattern);
    }

    #[test]
    fn footer_hints() {
        let config = KeyBindingsConfig { next: vec![binding("n")], edit: vec![], ..Default::default() };
        let bindings = CommandKeyBindings::try_from(config).expect("invalid bindings");
        assert_eq!(bindings.footer_hints(), "n next  <PageUp> prev  . run  q quit");
    }
}
