//! Code execution.

use crate::{
    code::snippet::{Snippet, SnippetLanguage},
    config::{ExecutionMode, LanguageSnippetExecutionConfig},
};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fmt::{self, Debug},
    fs::File,
    io::{self, Write},
    path::PathBuf,
    process::{self, Stdio},
};
use tempfile::TempDir;

static EXECUTORS: Lazy<HashMap<SnippetLanguage, LanguageSnippetExecutionConfig>> =
    Lazy::new(|| serde_yaml::from_slice(include_bytes!("../../executors.yaml")).expect("executors.yaml is broken"));

/// Something that knows how to run snippets.
pub(crate) trait SnippetExecutor {
    /// Whether snippets in this language can be executed.
    fn is_execution_supported(&self, language: &SnippetLanguage) -> bool;

    /// The marker that hides lines in snippets written in this language.
    fn hidden_line_marker(&self, language: &SnippetLanguage) -> Option<&str> {
        language.default_hidden_line_marker()
    }

    /// Whether the output of snippets in this language should be captured.
    fn execution_mode(&self, _language: &SnippetLanguage) -> ExecutionMode {
        ExecutionMode::Script
    }

    /// Run a snippet.
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, CodeExecuteError>;
}

/// A request to execute a snippet.
#[derive(Clone, Debug)]
pub(crate) struct ExecutionRequest<'a> {
    pub(crate) snippet: &'a Snippet,
    pub(crate) bindings: ExecutionBindings,
    pub(crate) output: OutputSink,
}

/// Values exposed to a snippet while it runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct ExecutionBindings {
    /// The width of the content area, in columns.
    pub(crate) width: u16,

    /// The height of the content area, in rows.
    pub(crate) height: u16,
}

impl ExecutionBindings {
    pub(crate) fn environment(&self) -> [(&'static str, String); 4] {
        let width = self.width.to_string();
        let height = self.height.to_string();
        [("WIDTH", width.clone()), ("HEIGHT", height.clone()), ("COLUMNS", width), ("LINES", height)]
    }
}

/// Where a snippet's standard output goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputSink {
    /// Collect it and hand it back to the caller.
    Capture,

    /// Write it straight into the terminal.
    Inherit,

    /// Drop it.
    Discard,
}

/// The result of running a snippet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExecutionOutput {
    /// Everything the snippet wrote to stdout, if it was captured.
    pub(crate) stdout: String,
}

/// Runs snippets by writing them to a file and spawning a process per language.
pub(crate) struct ProcessExecutor {
    executors: HashMap<SnippetLanguage, LanguageSnippetExecutionConfig>,
    cwd: PathBuf,
}

impl ProcessExecutor {
    pub(crate) fn new(
        custom_executors: HashMap<SnippetLanguage, LanguageSnippetExecutionConfig>,
        cwd: PathBuf,
    ) -> Result<Self, InvalidSnippetConfig> {
        let mut executors = EXECUTORS.clone();
        executors.extend(custom_executors);
        for (language, config) in &executors {
            if config.filename.is_empty() {
                return Err(InvalidSnippetConfig(language.clone(), "filename is empty"));
            }
            if config.commands.is_empty() {
                return Err(InvalidSnippetConfig(language.clone(), "no commands given"));
            }
            for command in &config.commands {
                if command.is_empty() {
                    return Err(InvalidSnippetConfig(language.clone(), "empty command given"));
                }
            }
        }
        Ok(Self { executors, cwd })
    }

    fn write_snippet(snippet: &Snippet, config: &LanguageSnippetExecutionConfig) -> Result<TempDir, CodeExecuteError> {
        let script_dir =
            tempfile::Builder::default().prefix(".livedeck").tempdir().map_err(CodeExecuteError::TempDir)?;
        let snippet_path = script_dir.path().join(&config.filename);
        let mut snippet_file = File::create(snippet_path).map_err(CodeExecuteError::TempDir)?;
        snippet_file.write_all(snippet.executable_contents().as_bytes()).map_err(CodeExecuteError::TempDir)?;
        Ok(script_dir)
    }

    fn run_command(
        &self,
        mut command: Vec<String>,
        config: &LanguageSnippetExecutionConfig,
        script_dir: &TempDir,
        request: &ExecutionRequest,
    ) -> Result<Vec<u8>, CodeExecuteError> {
        let script_dir = script_dir.path().to_string_lossy();
        for arg in &mut command {
            *arg = arg.replace("$pwd", &script_dir);
        }
        let Some((program, args)) = command.split_first() else {
            return Err(CodeExecuteError::Running("empty command".into()));
        };
        let (stdin, stdout, stderr) = match request.output {
            OutputSink::Capture => (Stdio::null(), Stdio::piped(), Stdio::piped()),
            OutputSink::Inherit => (Stdio::inherit(), Stdio::inherit(), Stdio::inherit()),
            OutputSink::Discard => (Stdio::null(), Stdio::null(), Stdio::piped()),
        };
        tracing::debug!("running {command:?}");
        let child = process::Command::new(program)
            .args(args)
            .envs(&config.environment)
            .envs(request.bindings.environment())
            .current_dir(&self.cwd)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| CodeExecuteError::SpawnProcess(program.clone(), e))?;

        let output = child.wait_with_output().map_err(CodeExecuteError::Waiting)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
                Some(line) => line.trim_end().to_string(),
                None => output.status.to_string(),
            };
            return Err(CodeExecuteError::Running(message));
        }
        Ok(output.stdout)
    }
}

impl SnippetExecutor for ProcessExecutor {
    fn is_execution_supported(&self, language: &SnippetLanguage) -> bool {
        self.executors.contains_key(language)
    }

    fn hidden_line_marker(&self, language: &SnippetLanguage) -> Option<&str> {
        match self.executors.get(language) {
            Some(config) => config.hidden_line_marker.as_deref(),
            None => language.default_hidden_line_marker(),
        }
    }

    fn execution_mode(&self, language: &SnippetLanguage) -> ExecutionMode {
        self.executors.get(language).map(|config| config.mode).unwrap_or_default()
    }

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, CodeExecuteError> {
        let language = &request.snippet.language;
        let config =
            self.executors.get(language).ok_or_else(|| CodeExecuteError::UnsupportedExecution(language.clone()))?;
        let script_dir = Self::write_snippet(request.snippet, config)?;
        let mut stdout = Vec::new();
        for command in &config.commands {
            let output = self.run_command(command.clone(), config, &script_dir, request)?;
            stdout.extend(output);
        }
        Ok(ExecutionOutput { stdout: String::from_utf8_lossy(&stdout).into_owned() })
    }
}

impl Debug for ProcessExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessExecutor {{ .. }}")
    }
}

#[cfg(test)]
type SnippetFn = Box<dyn Fn(&str, &ExecutionBindings) -> Result<String, String>>;

/// Runs snippets through Rust closures registered per language.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FnExecutor {
    functions: HashMap<SnippetLanguage, SnippetFn>,
}

#[cfg(test)]
impl FnExecutor {
    pub(crate) fn register<F>(&mut self, language: SnippetLanguage, function: F)
    where
        F: Fn(&str, &ExecutionBindings) -> Result<String, String> + 'static,
    {
        self.functions.insert(language, Box::new(function));
    }
}

#[cfg(test)]
impl SnippetExecutor for FnExecutor {
    fn is_execution_supported(&self, language: &SnippetLanguage) -> bool {
        self.functions.contains_key(language)
    }

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, CodeExecuteError> {
        let language = &request.snippet.language;
        let function =
            self.functions.get(language).ok_or_else(|| CodeExecuteError::UnsupportedExecution(language.clone()))?;
        let stdout =
            function(request.snippet.executable_contents(), &request.bindings).map_err(CodeExecuteError::Running)?;
        match request.output {
            OutputSink::Capture => Ok(ExecutionOutput { stdout }),
            OutputSink::Inherit => {
                print!("{stdout}");
                Ok(ExecutionOutput::default())
            }
            OutputSink::Discard => Ok(ExecutionOutput::default()),
        }
    }
}

/// An invalid executor was found.
#[derive(thiserror::Error, Debug)]
#[error("invalid snippet execution for '{0}': {1}")]
pub struct InvalidSnippetConfig(SnippetLanguage, &'static str);

/// An error during the execution of some code.
#[derive(thiserror::Error, Debug)]
pub(crate) enum CodeExecuteError {
    #[error("{0} code can't be executed")]
    UnsupportedExecution(SnippetLanguage),

    #[error("error creating temporary directory: {0}")]
    TempDir(io::Error),

    #[error("error spawning process '{0}': {1}")]
    SpawnProcess(String, io::Error),

    #[error("error waiting for process to run: {0}")]
    Waiting(io::Error),

    #[error("{0}")]
    Running(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn request(snippet: &Snippet) -> ExecutionRequest<'_> {
        ExecutionRequest { snippet, bindings: ExecutionBindings { width: 42, height: 10 }, output: OutputSink::Capture }
    }

    fn sh_executor() -> ProcessExecutor {
        let config = LanguageSnippetExecutionConfig {
            filename: "script.sh".into(),
            environment: HashMap::from([("GREETING".to_string(), "hi".to_string())]),
            commands: vec![vec!["sh".into(), "$pwd/script.sh".into()]],
            hidden_line_marker: Some("# HIDE".into()),
            mode: ExecutionMode::Script,
        };
        ProcessExecutor::new(HashMap::from([(SnippetLanguage::Bash, config)]), PathBuf::from("./"))
            .expect("invalid executor")
    }

    #[test]
    fn built_in_executors() {
        ProcessExecutor::new(Default::default(), PathBuf::from("./")).expect("invalid default executors");
    }

    #[test]
    fn shell_is_command_mode() {
        let executor = ProcessExecutor::new(Default::default(), PathBuf::from("./")).expect("invalid executors");
        assert_eq!(executor.execution_mode(&SnippetLanguage::Shell), ExecutionMode::Command);
        assert_eq!(executor.execution_mode(&SnippetLanguage::Python), ExecutionMode::Script);
    }

    #[test]
    fn captures_stdout() {
        let snippet = Snippet::new("echo 'hello world'\necho 'bye'", SnippetLanguage::Bash);
        let output = sh_executor().execute(&request(&snippet)).expect("execution failed");
        assert_eq!(output.stdout, "hello world\nbye\n");
    }

    #[test]
    fn environment() {
        let snippet = Snippet::new("echo \"$GREETING $WIDTH $HEIGHT $COLUMNS $LINES\"", SnippetLanguage::Bash);
        let output = sh_executor().execute(&request(&snippet)).expect("execution failed");
        assert_eq!(output.stdout, "hi 42 10 42 10\n");
    }

    #[test]
    fn ansi_escapes_kept() {
        let snippet = Snippet::new("printf '\\033[1mbold\\033[0m\\n'", SnippetLanguage::Bash);
        let output = sh_executor().execute(&request(&snippet)).expect("execution failed");
        assert_eq!(output.stdout, "\x1b[1mbold\x1b[0m\n");
    }

    #[rstest]
    #[case::stderr("echo 'first' >&2\necho 'it broke' >&2\nexit 1", "it broke")]
    #[case::no_stderr("exit 3", "exit status: 3")]
    fn failure_message(#[case] contents: &str, #[case] expected: &str) {
        let snippet = Snippet::new(contents, SnippetLanguage::Bash);
        let error = sh_executor().execute(&request(&snippet)).expect_err("execution succeeded");
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn unsupported_language() {
        let snippet = Snippet::new("", SnippetLanguage::Unknown("potato".into()));
        let error = sh_executor().execute(&request(&snippet)).expect_err("execution succeeded");
        assert!(matches!(error, CodeExecuteError::UnsupportedExecution(_)));
    }

    #[test]
    fn invalid_custom_executor() {
        let config = LanguageSnippetExecutionConfig {
            filename: "script.sh".into(),
            environment: Default::default(),
            commands: vec![vec![]],
            hidden_line_marker: None,
            mode: ExecutionMode::Script,
        };
        let result = ProcessExecutor::new(HashMap::from([(SnippetLanguage::Bash, config)]), PathBuf::from("./"));
        assert!(result.is_err());
    }

    #[test]
    fn function_executor() {
        let mut executor = FnExecutor::default();
        executor.register(SnippetLanguage::Python, |contents, bindings| {
            Ok(format!("{} {}", contents.len(), bindings.width))
        });
        let snippet = Snippet::new("abc", SnippetLanguage::Python);
        assert!(executor.is_execution_supported(&SnippetLanguage::Python));
        assert!(!executor.is_execution_supported(&SnippetLanguage::Ruby));
        let output = executor.execute(&request(&snippet)).expect("execution failed");
        assert_eq!(output.stdout, "3 42");
    }
}
