//! Minimal CSV building for report exports.
//!
//! Output follows RFC 4180: fields containing a comma, quote, CR or LF are
//! quoted, embedded quotes doubled, and records end with CRLF.

/// Quote a field if it contains a delimiter, quote, or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Accumulates a header and rows into a CSV document.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    out: String,
    columns: usize,
}

impl CsvWriter {
    /// Start a document with the given header row.
    pub fn new(header: &[&str]) -> Self {
        let mut writer = Self {
            out: String::new(),
            columns: header.len(),
        };
        writer.push_record(header.iter().copied());
        writer
    }

    /// Append one row. Rows shorter than the header are padded with empty
    /// fields; longer rows are written as-is.
    pub fn row<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values: Vec<String> = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        if values.len() < self.columns {
            values.resize(self.columns, String::new());
        }
        self.push_record(values.iter().map(String::as_str));
        self
    }

    fn push_record<'a>(&mut self, fields: impl Iterator<Item = &'a str>) {
        let line = fields.map(csv_escape).collect::<Vec<_>>().join(",");
        self.out.push_str(&line);
        self.out.push_str("\r\n");
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Render an optional value as a CSV field (empty when absent).
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
