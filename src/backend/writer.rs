//! Output writer with indentation tracking

use super::config::ExportConfig;

/// Writer that tracks indentation and builds exported text.
#[derive(Debug)]
pub struct CodeWriter {
    output: String,
    indent_level: usize,
    config: ExportConfig,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            config,
            at_line_start: true,
        }
    }

    /// Get the exported text, applying the trailing newline policy.
    pub fn finish(mut self) -> String {
        if !self.config.trailing_newline {
            while self.output.ends_with('\n') {
                self.output.pop();
            }
        }
        self.output
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.config.indent);
            }
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    pub fn blank_lines(&mut self, count: usize) {
        for _ in 0..count {
            self.newline();
        }
    }

    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }
}
