use crate::settings::ReaderSettings;

/// One directive: its tokens and the number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based
    pub number: usize,
    pub tokens: Vec<String>,
}

/// Folds physical lines into whitespace-tokenized logical lines.
///
/// Blank lines and comment lines are skipped. A line ending in the
/// continuation character is joined with the next physical line.
pub struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    settings: &'a ReaderSettings,
}

impl<'a> LineReader<'a> {
    pub fn new(content: &'a str, settings: &'a ReaderSettings) -> Self {
        Self {
            lines: content.lines().enumerate(),
            settings,
        }
    }

    fn is_comment(&self, line: &str) -> bool {
        line.starts_with(self.settings.comment_prefix.as_str())
    }
}

impl Iterator for LineReader<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let mut joined = String::new();
        let mut first_number = None;

        while let Some((index, raw)) = self.lines.next() {
            let line = raw.trim();

            if first_number.is_none() && (line.is_empty() || self.is_comment(line)) {
                continue;
            }
            first_number.get_or_insert(index + 1);

            match line.strip_suffix(self.settings.continuation) {
                Some(head) => {
                    joined.push_str(head);
                    joined.push(' ');
                }
                None => {
                    joined.push_str(line);
                    break;
                }
            }
        }

        let number = first_number?;
        let tokens = joined.split_whitespace().map(str::to_string).collect();
        Some(LogicalLine { number, tokens })
    }
}
