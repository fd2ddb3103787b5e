/// Field separator for customer records.
pub const DELIMITER: u8 = b',';

/// One raw input line, terminator removed, tagged with its 1-based position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: u64,
    pub bytes: Vec<u8>,
}

/// Drop a trailing `\n` or `\r\n`.
pub fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Locate field `index` of a comma-delimited record without splitting the whole line.
///
/// The window narrows from both ends at once: each round drops the leading and the trailing
/// field until the wanted field is either the first or the last one left.
/// Returns `None` when the record has fewer than `index + 1` fields.
pub fn extract_field(record: &[u8], index: usize) -> Option<&[u8]> {
    let mut remaining = record.iter().filter(|&&b| b == DELIMITER).count();
    if index > remaining {
        return None;
    }

    let mut window = record;
    let mut index = index;
    loop {
        if remaining == 0 {
            return Some(window);
        }

        let first = window.iter().position(|&b| b == DELIMITER)?;
        let last = window.iter().rposition(|&b| b == DELIMITER)?;

        if index == 0 {
            return Some(&window[..first]);
        }
        if index == remaining {
            return Some(&window[last + 1..]);
        }

        window = &window[first + 1..last];
        index -= 1;
        remaining -= 2;
    }
}
