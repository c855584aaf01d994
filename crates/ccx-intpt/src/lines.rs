//! Whitespace-tokenized view of a `.dat` file.

/// One non-blank input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the source file
    pub number: usize,
    pub tokens: Vec<String>,
}

impl Line {
    /// Data lines start with an element number; everything else is a header.
    pub fn is_data(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|t| t.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn is_header(&self) -> bool {
        !self.is_data()
    }

    /// First three tokens joined with single spaces.
    pub fn header_key(&self) -> String {
        self.tokens
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split raw file content into lines, dropping blank ones.
pub fn tokenize(raw: &str) -> Vec<Line> {
    raw.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if tokens.is_empty() {
                None
            } else {
                Some(Line {
                    number: i + 1,
                    tokens,
                })
            }
        })
        .collect()
}
