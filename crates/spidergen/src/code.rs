/// Indentation unit of the generated Python code.
pub const INDENT: &str = "    ";

/// Line-oriented output buffer for generated Python source.
#[derive(Clone, Debug, Default)]
pub struct CodeBuffer {
    output: String,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `code` at `level` indentation units, terminated by a newline.
    pub fn line(&mut self, level: usize, code: impl AsRef<str>) -> &mut Self {
        self.append_indent(level);
        self.output.push_str(code.as_ref());
        self.append_newline();
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.append_newline();
        self
    }

    pub fn into_string(self) -> String {
        self.output
    }

    #[inline(always)]
    fn append_indent(&mut self, level: usize) {
        self.output.push_str(&INDENT.repeat(level));
    }

    #[inline(always)]
    fn append_newline(&mut self) {
        self.output.push('\n');
    }
}

/// Escapes text for embedding in a single-quoted Python string literal.
pub fn quote_single(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
