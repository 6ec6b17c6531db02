use semlink_types::RecordLayout;

/// A pointer line split into fields with the whitespace between them kept.
///
/// Tokens alternate field, separator, field, ... and always start and end
/// with a (possibly empty) field, so field `i` lives at token `2 * i` and
/// concatenating the tokens gives back the original line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    tokens: Vec<String>,
}

impl Record {
    pub fn parse(line: &str) -> Self {
        let mut tokens = Vec::new();
        let mut start = 0;
        let mut in_space = false;
        for (idx, ch) in line.char_indices() {
            let space = ch.is_whitespace();
            if space != in_space {
                tokens.push(line[start..idx].to_string());
                start = idx;
                in_space = space;
            }
        }
        tokens.push(line[start..].to_string());
        if in_space {
            tokens.push(String::new());
        }
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Positional field, counting only non-separator tokens.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.tokens.get(index * 2).map(String::as_str)
    }

    /// Number of non-empty fields; an empty line has none.
    pub fn field_count(&self) -> usize {
        self.tokens
            .iter()
            .step_by(2)
            .filter(|field| !field.is_empty())
            .count()
    }

    /// Tokens from the first role pointer on, separators included.
    pub fn tail(&self, layout: &RecordLayout) -> &[String] {
        self.tokens.get(layout.role_start * 2..).unwrap_or(&[])
    }

    /// Swap in a cleaned tail, keeping the fixed fields and their spacing.
    pub fn replace_tail(&mut self, layout: &RecordLayout, tail: Vec<String>) {
        let head = (layout.role_start * 2).min(self.tokens.len());
        self.tokens.truncate(head);
        self.tokens.extend(tail);
    }

    /// Reassemble the line, byte-for-byte identical when nothing was changed.
    pub fn to_line(&self) -> String {
        self.tokens.concat()
    }
}
