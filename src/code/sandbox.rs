use super::{
    execute::{ExecutionBindings, ExecutionOutput, ExecutionRequest, OutputSink, SnippetExecutor},
    snippet::{Snippet, SnippetLanguage},
};
use crate::{
    config::{CommandOutput, ExecutionMode},
    render::properties::ViewerContext,
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

/// The result of running a snippet inside the sandbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Execution {
    /// What should be displayed: the captured output or an `Error: ...` line.
    pub(crate) output: String,

    /// The reason the execution failed, if it did.
    pub(crate) fault: Option<String>,
}

/// Runs snippets making sure nothing that goes wrong while doing so reaches the caller.
#[derive(Clone)]
pub(crate) struct ExecutionSandbox {
    executor: Rc<dyn SnippetExecutor>,
    command_output: CommandOutput,
}

impl ExecutionSandbox {
    pub(crate) fn new(executor: Rc<dyn SnippetExecutor>, command_output: CommandOutput) -> Self {
        Self { executor, command_output }
    }

    pub(crate) fn is_execution_supported(&self, language: &SnippetLanguage) -> bool {
        self.executor.is_execution_supported(language)
    }

    pub(crate) fn hidden_line_marker(&self, language: &SnippetLanguage) -> Option<&str> {
        self.executor.hidden_line_marker(language)
    }

    /// Run a snippet and capture its output.
    ///
    /// Snippets in languages that run as commands aren't captured: their output goes wherever the
    /// configuration says and the returned output is empty.
    pub(crate) fn execute(&self, snippet: &Snippet, context: &ViewerContext) -> Execution {
        let sink = match self.executor.execution_mode(&snippet.language) {
            ExecutionMode::Script => OutputSink::Capture,
            ExecutionMode::Command => match self.command_output {
                CommandOutput::Terminal => OutputSink::Inherit,
                CommandOutput::Discard => OutputSink::Discard,
            },
        };
        match self.run(snippet, context, sink) {
            Ok(output) => Execution { output: trim_lines(&output.stdout), fault: None },
            Err(fault) => {
                tracing::warn!("execution of {} snippet failed: {fault}", snippet.language);
                Execution { output: format!("Error: {fault}"), fault: Some(fault) }
            }
        }
    }

    /// Run a snippet letting it write straight to the terminal.
    ///
    /// Returns the fault, if any.
    pub(crate) fn execute_inherited(&self, snippet: &Snippet, context: &ViewerContext) -> Option<String> {
        match self.run(snippet, context, OutputSink::Inherit) {
            Ok(_) => None,
            Err(fault) => {
                tracing::warn!("execution of {} snippet failed: {fault}", snippet.language);
                Some(fault)
            }
        }
    }

    fn run(&self, snippet: &Snippet, context: &ViewerContext, output: OutputSink) -> Result<ExecutionOutput, String> {
        let bindings = ExecutionBindings { width: context.content_columns, height: context.content_rows };
        let request = ExecutionRequest { snippet, bindings, output };
        let executor = &self.executor;
        match panic::catch_unwind(AssertUnwindSafe(|| executor.execute(&request))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(panic_message(payload)),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "snippet panicked".into()
    }
}

fn trim_lines(output: &str) -> String {
    output.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}
