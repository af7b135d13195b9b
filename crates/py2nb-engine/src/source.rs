//! Line-oriented view of a source file.

/// Raw text lines of one input file, index-aligned with the tagger's
/// 0-based line numbers.
///
/// `\r\n` and lone `\r` are normalized to `\n` and trailing whitespace is
/// stripped from every line. [`SourceLines::text`] re-joins the lines, so the
/// parser sees exactly the lines the segmenter will read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
}

impl SourceLines {
    pub fn from_text(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let lines = normalized
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect();
        Self { lines }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The normalized text, one `\n` after every line.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Lines prefixed with their 0-based number, matching the keys of a
    /// [`LineTagMap`](crate::tagging::LineTagMap).
    pub fn numbered(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{i:4}: {line}\n"))
            .collect()
    }
}
