//! Fixed-width ASCII table rendering for `show_tables` and `desc_table`.

/// Collects captions and records, then renders them as a bordered table:
///
/// ```text
/// +-------+------+-------+
/// | Field | Type | Index |
/// +-------+------+-------+
/// | id    | INT  | YES   |
/// +-------+------+-------+
/// ```
pub struct TablePrinter {
    captions: Vec<String>,
    column_widths: Vec<usize>,
    records: Vec<Vec<String>>,
}

impl TablePrinter {
    pub fn new<S: Into<String>>(captions: Vec<S>) -> Self {
        let captions: Vec<String> = captions.into_iter().map(|c| c.into()).collect();
        let column_widths = captions.iter().map(|c| c.chars().count()).collect();
        Self {
            captions,
            column_widths,
            records: Vec::new(),
        }
    }

    /// Appends a record, widening columns as needed. The record must have
    /// one value per caption.
    pub fn add_record(&mut self, record: Vec<String>) {
        debug_assert_eq!(record.len(), self.captions.len());
        for (width, value) in self.column_widths.iter_mut().zip(&record) {
            *width = (*width).max(value.chars().count());
        }
        self.records.push(record);
    }

    fn separator_line(&self) -> String {
        let line = self
            .column_widths
            .iter()
            .map(|width| "-".repeat(width + 2))
            .collect::<Vec<String>>()
            .join("+");
        format!("+{}+\n", line)
    }

    fn record_line(&self, record: &[String]) -> String {
        let line = self
            .column_widths
            .iter()
            .zip(record)
            .map(|(width, value)| format!(" {:<1$} ", value, *width))
            .collect::<Vec<String>>()
            .join("|");
        format!("|{}|\n", line)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.separator_line());
        out.push_str(&self.record_line(&self.captions));
        out.push_str(&self.separator_line());
        for record in &self.records {
            out.push_str(&self.record_line(record));
        }
        out.push_str(&self.separator_line());
        out
    }
}
