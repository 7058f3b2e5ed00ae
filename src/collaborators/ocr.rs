use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{CollaboratorError, OcrEngine, OcrOutput};
use crate::config::OcrConfig;

/// Runs the `tesseract` binary and rebuilds lines from its TSV output.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(cfg: &OcrConfig) -> Self {
        Self {
            binary: PathBuf::from(&cfg.binary),
            language: cfg.language.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, path: &Path) -> Result<OcrOutput, CollaboratorError> {
        let start = Instant::now();
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.language, "tsv"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CollaboratorError::Ocr(format!("failed to execute tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(path = %path.display(), status = ?output.status.code(), "tesseract_failure");
            return Err(CollaboratorError::Ocr(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_tesseract_tsv(&tsv)?;
        debug!(
            path = %path.display(),
            chars = parsed.text.len(),
            confidence = parsed.confidence,
            elapsed_micros = start.elapsed().as_micros(),
            "tesseract_success"
        );
        Ok(parsed)
    }
}

const LEVEL_WORD: &str = "5";

/// Rebuilds text lines from Tesseract TSV and averages word confidence.
///
/// Words are grouped by `(page, block, paragraph, line)` in output order.
/// Negative confidences mark non-word rows and are skipped.
pub fn parse_tesseract_tsv(tsv: &str) -> Result<OcrOutput, CollaboratorError> {
    let mut rows = tsv.lines();
    let header = rows
        .next()
        .ok_or_else(|| CollaboratorError::Ocr("empty tesseract output".into()))?;
    let columns: Vec<&str> = header.split('\t').collect();
    let col = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| CollaboratorError::Ocr(format!("tesseract tsv lacks column {name}")))
    };
    let (level, page, block, par, line, conf, text) = (
        col("level")?,
        col("page_num")?,
        col("block_num")?,
        col("par_num")?,
        col("line_num")?,
        col("conf")?,
        col("text")?,
    );

    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(String, String, String, String)> = None;
    let mut confidence_sum = 0.0f64;
    let mut words = 0usize;

    for row in rows {
        let cells: Vec<&str> = row.split('\t').collect();
        if cells.len() < columns.len() || cells[level] != LEVEL_WORD {
            continue;
        }
        let word = cells[text].trim();
        let word_conf: f64 = cells[conf].trim().parse().unwrap_or(-1.0);
        if word.is_empty() || word_conf < 0.0 {
            continue;
        }

        let key = (
            cells[page].to_string(),
            cells[block].to_string(),
            cells[par].to_string(),
            cells[line].to_string(),
        );
        match (&current_key, lines.last_mut()) {
            (Some(k), Some(last)) if *k == key => {
                last.push(' ');
                last.push_str(word);
            }
            _ => {
                lines.push(word.to_string());
                current_key = Some(key);
            }
        }
        confidence_sum += word_conf;
        words += 1;
    }

    let confidence = if words == 0 {
        0.0
    } else {
        (confidence_sum / words as f64 / 100.0).clamp(0.0, 1.0) as f32
    };
    Ok(OcrOutput {
        text: lines.join("\n"),
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: u32, line: u32, n: u32, conf: f64, text: &str) -> String {
        format!("5\t1\t{block}\t1\t{line}\t{n}\t0\t0\t10\t10\t{conf}\t{text}")
    }

    #[test]
    fn rebuilds_lines_and_averages_confidence() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t".to_string(),
            word(1, 1, 1, 90.0, "REPUBLICA"),
            word(1, 1, 2, 80.0, "DE"),
            word(1, 1, 3, 70.0, "COLOMBIA"),
            word(1, 2, 1, 60.0, "1.041.970.336"),
            word(2, 1, 1, 100.0, "RAMOS"),
        ]
        .join("\n");

        let out = parse_tesseract_tsv(&tsv).unwrap();
        assert_eq!(out.text, "REPUBLICA DE COLOMBIA\n1.041.970.336\nRAMOS");
        assert!((out.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn blank_and_negative_rows_are_skipped() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 1, -1.0, "ghost"),
            word(1, 1, 2, 95.0, "  "),
        ]
        .join("\n");
        let out = parse_tesseract_tsv(&tsv).unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.confidence, 0.0);
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(parse_tesseract_tsv("").is_err());
        assert!(parse_tesseract_tsv("level\ttext\n5\tword").is_err());
    }
}
