use super::ExtractionError;
use quick_xml::{Reader as XmlReader, events::Event};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the decompressed size of the document part.
const MAX_DOCUMENT_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Extract the raw text of a DOCX package.
///
/// Only `word/document.xml` is read. Text runs are concatenated, `w:tab` and `w:br`/`w:cr`
/// inside a run become a tab or newline, and paragraphs are separated by a blank line.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ExtractionError::InvalidDocx(format!("not a zip package: {error}")))?;

    let entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|error| ExtractionError::InvalidDocx(format!("missing {DOCUMENT_PART}: {error}")))?;
    let xml = read_document_part(entry, MAX_DOCUMENT_PART_BYTES)?;

    let text = collect_runs(&xml)?;
    tracing::debug!(
        entries = archive.len(),
        chars = text.chars().count(),
        "Extracted DOCX text"
    );
    Ok(text)
}

/// Read a zip entry into a string, refusing parts that inflate past `limit` bytes.
fn read_document_part(entry: impl Read, limit: u64) -> Result<String, ExtractionError> {
    let mut xml = String::new();
    entry
        .take(limit + 1)
        .read_to_string(&mut xml)
        .map_err(|error| {
            ExtractionError::InvalidDocx(format!("failed to read {DOCUMENT_PART}: {error}"))
        })?;
    if xml.len() as u64 > limit {
        return Err(ExtractionError::InvalidDocx(format!(
            "{DOCUMENT_PART} expands past {limit} bytes"
        )));
    }
    Ok(xml)
}

fn collect_runs(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_run = false;
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => start_paragraph(&mut output),
                b"w:r" => in_run = true,
                b"w:tab" if in_run => output.push('\t'),
                b"w:br" | b"w:cr" if in_run => output.push('\n'),
                b"w:t" => in_text_node = true,
                _ => {}
            },
            // Tab stops under `w:pPr/w:tabs` are also `w:tab`; only run-level ones are content.
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:p" => start_paragraph(&mut output),
                b"w:tab" if in_run => output.push('\t'),
                b"w:br" | b"w:cr" if in_run => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e.unescape().map_err(|error| {
                        ExtractionError::InvalidDocx(format!("invalid text run: {error}"))
                    })?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:r" => in_run = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(ExtractionError::InvalidDocx(format!(
                    "malformed document XML at byte {}: {error}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}

fn start_paragraph(output: &mut String) {
    if !output.is_empty() {
        output.push_str("\n\n");
    }
}
