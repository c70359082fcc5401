//! Export configuration

/// Layout of exported text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// String written once per indentation level
    pub indent: String,
    /// Whether non-empty output ends with a newline
    pub trailing_newline: bool,
    /// Number of blank lines written between top-level function definitions
    pub blank_lines_between_functions: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            trailing_newline: true,
            blank_lines_between_functions: 0,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `width` spaces instead of a tab
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }

    /// Set the indentation string
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }

    pub fn with_blank_lines_between_functions(mut self, count: usize) -> Self {
        self.blank_lines_between_functions = count;
        self
    }
}
