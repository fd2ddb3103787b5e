use std::io::BufRead;

use tracing::info;

use crate::error::{ImportError, Result};
use crate::record::{strip_line_terminator, DELIMITER};

const EMAIL_FIELD: &str = "email";

/// Find the zero-based column holding the email address in a header line.
///
/// A bare `email` line (single-column file) resolves to 0. Otherwise the header must have at
/// least two comma-separated fields, one of which equals `email` ignoring ASCII case. Fields
/// are not trimmed, so `email ` does not count.
pub fn resolve_email_column(header: &str) -> Result<usize> {
    let header = header.trim_end_matches(['\r', '\n']);
    if header.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    if header.trim() == EMAIL_FIELD {
        return Ok(0);
    }

    let fields: Vec<&str> = header.split(DELIMITER as char).collect();
    if fields.len() < 2 {
        return Err(ImportError::MissingEmailField);
    }

    fields
        .iter()
        .position(|field| field.eq_ignore_ascii_case(EMAIL_FIELD))
        .ok_or(ImportError::MissingEmailField)
}

/// Consume the first line of `reader` and resolve the email column from it.
pub fn read_email_column<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut raw = Vec::new();
    let read = reader
        .read_until(b'\n', &mut raw)
        .map_err(ImportError::HeaderRead)?;
    if read == 0 {
        return Err(ImportError::EmptyInput);
    }

    let header = String::from_utf8_lossy(strip_line_terminator(&raw));
    let index = resolve_email_column(&header)?;
    info!(
        action = "resolve",
        component = "header",
        email_column = index,
        "Resolved email column"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn finds_email_column_in_any_case() {
        let headers = [
            "first_name,last_name,email",
            "first_name,last_name,Email",
            "first_name,last_name,eMail",
            "first_name,last_name,emAil",
            "first_name,last_name,emaIl",
            "first_name,last_name,emaiL",
            "first_name,last_name,EMAIL",
        ];
        for header in headers {
            assert_eq!(resolve_email_column(header).unwrap(), 2, "{header}");
        }
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(resolve_email_column("email,Email,ip").unwrap(), 0);
        assert_eq!(resolve_email_column("id,email,email").unwrap(), 1);
    }

    #[test]
    fn bare_email_line_is_single_column() {
        assert_eq!(resolve_email_column("email").unwrap(), 0);
        assert_eq!(resolve_email_column(" email \n").unwrap(), 0);
    }

    #[test]
    fn rejects_headers_without_email_column() {
        let headers = [
            "first_name,last_name",
            " ",
            ",,,,",
            ",ema il",
            ",email ,",
            ",email   ",
            "Email",
        ];
        for header in headers {
            assert!(
                matches!(
                    resolve_email_column(header),
                    Err(ImportError::MissingEmailField)
                ),
                "{header:?}"
            );
        }
    }

    #[test]
    fn empty_header_is_empty_input() {
        assert!(matches!(
            resolve_email_column(""),
            Err(ImportError::EmptyInput)
        ));
        assert!(matches!(
            resolve_email_column("\r\n"),
            Err(ImportError::EmptyInput)
        ));
    }

    #[test]
    fn reads_only_the_first_line() {
        let mut reader = Cursor::new("first_name,lastname\nemail");
        assert!(matches!(
            read_email_column(&mut reader),
            Err(ImportError::MissingEmailField)
        ));

        let mut reader = Cursor::new("name,email\r\na,b@c.com\n");
        assert_eq!(read_email_column(&mut reader).unwrap(), 1);
        let mut rest = String::new();
        std::io::Read::read_to_string(&mut reader, &mut rest).unwrap();
        assert_eq!(rest, "a,b@c.com\n");
    }

    #[test]
    fn empty_reader_is_empty_input() {
        let mut reader = Cursor::new("");
        assert!(matches!(
            read_email_column(&mut reader),
            Err(ImportError::EmptyInput)
        ));
    }
}
