use chrono::NaiveDateTime;

use crate::errors::ParserError;

pub(crate) const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decodes a UTF-16 byte stream. A BOM selects the byte order, otherwise little-endian is assumed.
pub fn decode_utf16(parser: &'static str, bytes: &[u8]) -> Result<String, ParserError> {
    let (body, big_endian) = match bytes {
        [a, b, rest @ ..] if [*a, *b] == UTF16_LE_BOM => (rest, false),
        [a, b, rest @ ..] if [*a, *b] == UTF16_BE_BOM => (rest, true),
        _ => (bytes, false),
    };

    if body.len() % 2 != 0 {
        return Err(ParserError::Encoding {
            parser,
            message: format!("odd byte length {} for UTF-16 content", body.len()),
        });
    }

    let units = body.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|err| ParserError::Encoding {
            parser,
            message: err.to_string(),
        })
}

/// 1-based line numbers of every line containing `marker`.
pub(crate) fn marker_lines(content: &str, marker: &str) -> Vec<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.contains(marker))
        .map(|(idx, _)| idx + 1)
        .collect()
}

pub(crate) fn parse_timestamp(
    parser: &'static str,
    value: &str,
    line_index: usize,
) -> Result<NaiveDateTime, ParserError> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map_err(|err| ParserError::DataRow {
        parser,
        line_index,
        message: format!("invalid timestamp '{trimmed}': {err}"),
    })
}

pub(crate) fn parse_required_i64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<i64, ParserError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse {column} '{}' as integer: {err}", value.trim()),
        })
}

pub(crate) fn parse_required_f64(
    parser: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<f64, ParserError> {
    let trimmed = value.trim();
    let parsed = trimmed
        .parse::<f64>()
        .map_err(|err| ParserError::DataRow {
            parser,
            line_index,
            message: format!("failed to parse {column} '{trimmed}' as float: {err}"),
        })?;
    if !parsed.is_finite() {
        return Err(ParserError::DataRow {
            parser,
            line_index,
            message: format!("{column} '{trimmed}' is not a finite number"),
        });
    }
    Ok(parsed)
}

/// Returns the whitespace token at 1-based `position`.
pub(crate) fn token<'a>(
    parser: &'static str,
    tokens: &[&'a str],
    position: usize,
    line_index: usize,
) -> Result<&'a str, ParserError> {
    tokens
        .get(position - 1)
        .copied()
        .ok_or_else(|| ParserError::DataRow {
            parser,
            line_index,
            message: format!(
                "expected at least {position} fields but found {}",
                tokens.len()
            ),
        })
}
