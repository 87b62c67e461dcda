//! Glyph sheet parsing.
//!
//! Font variants are embedded as plain-text sheets. A `char <c>` header line
//! introduces a glyph (the word `space` names the blank glyph), and every
//! following line is one row of that glyph: `#` for a filled cell, `.` for an
//! empty one. Rows run until the next header or the end of the sheet. Blank
//! lines are ignored.

use std::collections::HashMap;

use thiserror::Error;

use super::{FontVariant, Glyph};

/// Characters every variant must define so that rendering a formatted
/// measurement can never miss a glyph outright.
pub(super) const REQUIRED: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '.', ' ', '?'];

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("font `{font}` line {line}: glyph row before any `char` header")]
    RowOutsideGlyph { font: String, line: usize },

    #[error("font `{font}` line {line}: malformed header `{text}`")]
    BadHeader { font: String, line: usize, text: String },

    #[error("font `{font}` line {line}: unexpected cell symbol `{symbol}`")]
    BadCell { font: String, line: usize, symbol: char },

    #[error("font `{font}`: glyph `{ch}` has no rows")]
    EmptyGlyph { font: String, ch: char },

    #[error("font `{font}`: glyph `{ch}` has ragged rows")]
    RaggedGlyph { font: String, ch: char },

    #[error("font `{font}`: missing required glyph `{ch}`")]
    MissingGlyph { font: String, ch: char },
}

/// Parse one sheet into a [`FontVariant`].
pub(super) fn parse(font: &str, text: &str) -> Result<FontVariant, SheetError> {
    let mut glyphs: HashMap<char, Glyph> = HashMap::new();
    let mut current: Option<(char, Vec<Vec<bool>>)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.is_empty() {
            continue;
        }
        if let Some(rest) = raw.strip_prefix("char ") {
            if let Some((ch, rows)) = current.take() {
                glyphs.insert(ch, build_glyph(font, ch, rows)?);
            }
            let ch = header_char(font, line, rest)?;
            current = Some((ch, Vec::new()));
        } else {
            let rows = match current.as_mut() {
                Some((_, rows)) => rows,
                None => {
                    return Err(SheetError::RowOutsideGlyph {
                        font: font.to_string(),
                        line,
                    })
                }
            };
            let mut row = Vec::with_capacity(raw.len());
            for symbol in raw.chars() {
                match symbol {
                    '#' => row.push(true),
                    '.' => row.push(false),
                    other => {
                        return Err(SheetError::BadCell {
                            font: font.to_string(),
                            line,
                            symbol: other,
                        })
                    }
                }
            }
            rows.push(row);
        }
    }
    if let Some((ch, rows)) = current.take() {
        glyphs.insert(ch, build_glyph(font, ch, rows)?);
    }

    for &ch in REQUIRED {
        if !glyphs.contains_key(&ch) {
            return Err(SheetError::MissingGlyph {
                font: font.to_string(),
                ch,
            });
        }
    }

    // REQUIRED guarantees '?' is present.
    let fallback = glyphs.remove(&'?').ok_or(SheetError::MissingGlyph {
        font: font.to_string(),
        ch: '?',
    })?;

    Ok(FontVariant::assemble(font.to_string(), glyphs, fallback))
}

fn header_char(font: &str, line: usize, rest: &str) -> Result<char, SheetError> {
    if rest == "space" {
        return Ok(' ');
    }
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(SheetError::BadHeader {
            font: font.to_string(),
            line,
            text: rest.to_string(),
        }),
    }
}

fn build_glyph(font: &str, ch: char, rows: Vec<Vec<bool>>) -> Result<Glyph, SheetError> {
    if rows.is_empty() {
        return Err(SheetError::EmptyGlyph {
            font: font.to_string(),
            ch,
        });
    }
    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return Err(SheetError::RaggedGlyph {
            font: font.to_string(),
            ch,
        });
    }
    Ok(Glyph::new(width, rows))
}
