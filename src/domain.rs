use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Restricted address grammar: word/hyphen/dot local part, then dot-separated labels
/// ending in a label of at least two characters. Unicode is off, so `\w` is `[0-9A-Za-z_]`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^[\w.\-]+@(?:[\w-]+\.)+[\w-]{2,}$")
        .expect("hard-coded email pattern should be valid")
});

/// A field that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address<'a> {
    /// The full address, byte-exact as it appeared in the record.
    pub email: &'a [u8],
    /// Everything after the first `@`, verbatim.
    pub domain: &'a str,
}

pub fn is_valid_email(field: &[u8]) -> bool {
    EMAIL_PATTERN.is_match(field)
}

/// Validate `field` and split off its domain.
///
/// Returns `None` when the field does not match the address grammar or the domain is not
/// valid UTF-8.
pub fn parse_address(field: &[u8]) -> Option<Address<'_>> {
    if !is_valid_email(field) {
        return None;
    }

    let at = field.iter().position(|&b| b == b'@')?;
    let domain = std::str::from_utf8(&field[at + 1..]).ok()?;
    Some(Address {
        email: field,
        domain,
    })
}

/// Grouping key for a domain. Case is preserved unless `fold_case` is set.
pub fn normalize_domain(domain: &str, fold_case: bool) -> Cow<'_, str> {
    if fold_case && domain.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(domain.to_ascii_lowercase())
    } else {
        Cow::Borrowed(domain)
    }
}

/// Bytes to fingerprint for `address`. With `fold_case`, the domain half is lowercased so that
/// `a@Example.com` and `a@example.com` count once.
pub fn fingerprint_input<'a>(address: &Address<'a>, domain_key: &str) -> Cow<'a, [u8]> {
    let local_len = address.email.len() - address.domain.len();
    if domain_key.as_bytes() == address.domain.as_bytes() {
        return Cow::Borrowed(address.email);
    }

    let mut bytes = Vec::with_capacity(address.email.len());
    bytes.extend_from_slice(&address.email[..local_len]);
    bytes.extend_from_slice(domain_key.as_bytes());
    Cow::Owned(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in [
            "test@example.com",
            "first.last@sub.example.co.uk",
            "with-hyphen_and_underscore@my-domain.org",
            "dhenry2@hubpages.com",
        ] {
            assert!(is_valid_email(email.as_bytes()), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "invalid@@test.com",
            "invalid@!test.com",
            "invalidtest.com",
            "user@localhost",
            "user@example.c",
            "us er@example.com",
            "user@example.com ",
            "user+tag@example.com",
            "józef@example.com",
            "user@exämple.com",
            "Ünïcode@münchen.de",
        ] {
            assert!(!is_valid_email(email.as_bytes()), "{email:?}");
        }
    }

    #[test]
    fn domain_is_everything_after_the_at() {
        let address = parse_address(b"Someone@Mail.Example.COM").unwrap();
        assert_eq!(address.domain, "Mail.Example.COM");
        assert_eq!(address.email, b"Someone@Mail.Example.COM");
    }

    #[test]
    fn invalid_field_has_no_address() {
        assert_eq!(parse_address(b"not-an-address"), None);
    }

    #[test]
    fn case_is_kept_unless_folding() {
        assert_eq!(normalize_domain("Example.COM", false), "Example.COM");
        assert_eq!(normalize_domain("Example.COM", true), "example.com");
        assert!(matches!(
            normalize_domain("example.com", true),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn folded_domain_changes_fingerprint_input() {
        let address = parse_address(b"Bob@Example.com").unwrap();
        assert_eq!(
            fingerprint_input(&address, "Example.com").as_ref(),
            b"Bob@Example.com"
        );
        assert_eq!(
            fingerprint_input(&address, "example.com").as_ref(),
            b"Bob@example.com"
        );
    }
}
