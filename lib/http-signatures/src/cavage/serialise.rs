use super::SignatureHeader;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

/// Characters `encodeURIComponent` leaves alone
const KEY_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Serialise the signature header into its textual representation
///
/// The key ID gets percent-encoded. The other values are written verbatim and must not contain `"`.
#[inline]
pub fn serialise<'a, I, S>(header: SignatureHeader<'_, I, S>) -> String
where
    I: Iterator<Item = &'a str>,
    S: AsRef<str>,
{
    let mut buffer = String::new();

    let _ = write!(
        buffer,
        "keyId=\"{}\"",
        utf8_percent_encode(header.key_id, KEY_ID_ENCODE_SET)
    );

    if let Some(algorithm) = header.algorithm {
        let _ = write!(buffer, ",algorithm=\"{algorithm}\"");
    }

    buffer.push_str(",headers=\"");
    for item in itertools::intersperse(header.headers, " ") {
        buffer.push_str(item);
    }
    buffer.push('"');

    let _ = write!(buffer, ",signature=\"{}\"", header.signature.as_ref());

    buffer
}

#[cfg(test)]
mod test {
    use super::serialise;
    use crate::cavage::{parse, SignatureHeader};
    use percent_encoding::percent_decode_str;

    #[test]
    fn field_order() {
        let header = SignatureHeader {
            key_id: "Test",
            algorithm: Some("rsa-sha256"),
            headers: ["(request-target)", "host", "date", "digest"].into_iter(),
            signature: "abc=",
        };

        assert_eq!(
            serialise(header),
            r#"keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date digest",signature="abc=""#
        );
    }

    #[test]
    fn encodes_key_id() {
        let key_id = "https://a.example/users/alice#main-key";
        let header = SignatureHeader {
            key_id,
            algorithm: None,
            headers: ["date"].into_iter(),
            signature: String::from("abc="),
        };

        let serialised = serialise(header);
        assert_eq!(
            serialised,
            r#"keyId="https%3A%2F%2Fa.example%2Fusers%2Falice%23main-key",headers="date",signature="abc=""#
        );

        let parsed = parse(&serialised).unwrap();
        assert_eq!(
            percent_decode_str(parsed.key_id).decode_utf8().unwrap(),
            key_id
        );
    }
}
