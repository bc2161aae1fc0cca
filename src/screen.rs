//! Output sinks for the `print` form.

/// Receives the text of each argument of a `print` form, one call per
/// argument, in evaluation order.
pub trait Screen {
    fn print(&mut self, text: &str);
}

/// Writes each printed value on its own line of standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutScreen;

impl Screen for StdoutScreen {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects printed values in memory, newline-terminated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferScreen {
    contents: String,
}

impl BufferScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Printed values, one entry per `print` argument.
    pub fn lines(&self) -> Vec<&str> {
        self.contents.lines().collect()
    }
}

impl Screen for BufferScreen {
    fn print(&mut self, text: &str) {
        self.contents.push_str(text);
        self.contents.push('\n');
    }
}
