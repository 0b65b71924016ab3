use crate::domain::model::{FormatRule, RowStyle};
use crate::domain::ports::SheetSink;
use crate::utils::error::{Result, SyncError};
use std::io::Write;
use std::sync::Mutex;

/// Dry-run sink: renders the grid as CSV instead of touching a spreadsheet.
pub struct CsvPreview<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> CsvPreview<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn render(values: &[Vec<String>]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in values {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| SyncError::IoError(e.into_error()))
    }
}

impl<W: Write + Send> SheetSink for CsvPreview<W> {
    async fn clear(&self) -> Result<()> {
        tracing::info!("Dry run: sheet would be cleared");
        Ok(())
    }

    async fn write_values(&self, values: &[Vec<String>]) -> Result<()> {
        let rendered = Self::render(values)?;
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        out.write_all(&rendered)?;
        out.flush()?;
        Ok(())
    }

    async fn apply_formats(&self, formats: &[FormatRule]) -> Result<()> {
        for rule in formats.iter().filter(|f| f.style == RowStyle::Highlight) {
            if let Some((start, _)) = rule.rows {
                // A1 row numbers are one-based.
                tracing::info!("Dry run: row {} would be highlighted", start + 1);
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "CSV preview on stdout".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_csv_with_quoting() {
        let preview = CsvPreview::new(Vec::new());
        let values = vec![
            vec!["Order ID".to_string(), "Customer Name".to_string()],
            vec!["1".to_string(), "Doe, Jane".to_string()],
        ];

        preview.clear().await.unwrap();
        preview.write_values(&values).await.unwrap();
        preview
            .apply_formats(&[FormatRule {
                rows: Some((1, 2)),
                style: RowStyle::Highlight,
            }])
            .await
            .unwrap();

        let output = String::from_utf8(preview.into_inner()).unwrap();
        assert_eq!(output, "Order ID,Customer Name\n1,\"Doe, Jane\"\n");
    }
}
