use std::{
    io::Write,
    process::{Command, Stdio},
};

use tracing::debug;

pub trait ClipboardSink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Puts `text` on the clipboard, returning whether it worked
    fn copy(&self, text: &str) -> bool;
}

/// Pipes the text into an external program such as `xclip` or `pbcopy`
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn pipe(&self, text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Dropping stdin closes the pipe so the program can exit
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        // Always reap the child, even when the write failed
        let status = child.wait()?;
        written?;

        Ok(status.success())
    }
}

impl ClipboardSink for CommandSink {
    fn name(&self) -> &str {
        &self.program
    }

    fn copy(&self, text: &str) -> bool {
        match self.pipe(text) {
            Ok(copied) => copied,
            Err(e) => {
                debug!(program = %self.program, error = %e, "clipboard program unavailable");
                false
            }
        }
    }
}

/// In-process clipboard access through `arboard`
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardSink;

impl ClipboardSink for ArboardSink {
    fn name(&self) -> &str {
        "arboard"
    }

    fn copy(&self, text: &str) -> bool {
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));

        match result {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "arboard could not set the clipboard");
                false
            }
        }
    }
}

/// Ordered list of clipboard backends, first success wins
#[derive(Default)]
pub struct ClipboardChain {
    sinks: Vec<Box<dyn ClipboardSink>>,
}

impl ClipboardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// `xclip`, then `pbcopy`, then `clip` on Windows, then `arboard`
    pub fn platform_default() -> Self {
        let mut chain = Self::new();
        chain
            .with_sink(CommandSink::new("xclip", &["-selection", "clipboard"]))
            .with_sink(CommandSink::new("pbcopy", &[]));

        if cfg!(windows) {
            chain.with_sink(CommandSink::new("clip", &[]));
        }

        chain.with_sink(ArboardSink);

        chain
    }

    pub fn with_sink(&mut self, sink: impl ClipboardSink + 'static) -> &mut Self {
        self.sinks.push(Box::new(sink));

        self
    }

    /// Tries each backend in order.
    ///
    /// Returns the name of the backend that took the text, or `None` when
    /// all of them failed.
    pub fn copy(&self, text: &str) -> Option<&str> {
        for sink in &self.sinks {
            if sink.copy(text) {
                debug!(backend = sink.name(), "copied to clipboard");
                return Some(sink.name());
            }

            debug!(backend = sink.name(), "clipboard backend failed");
        }

        None
    }
}
