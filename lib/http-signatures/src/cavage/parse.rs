use super::SignatureHeader;
use logos::{Logos, Span};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Error returned when a `Signature` header couldn't be parsed
#[derive(Debug, Diagnostic, Error)]
pub enum ParseError {
    /// A token showed up where it wasn't allowed
    #[error("Unexpected token")]
    #[diagnostic(
        code(cavage::unexpected_token),
        help("fields have to look like `name=\"value\"` and be separated by commas")
    )]
    UnexpectedToken {
        /// Location of the offending token
        #[label("didn't expect this")]
        span: SourceSpan,
    },

    /// The input ended in the middle of a field
    #[error("Unexpected end of input")]
    #[diagnostic(code(cavage::unexpected_end))]
    UnexpectedEnd {
        /// End of the input
        #[label("the field is incomplete")]
        span: SourceSpan,
    },

    /// A mandatory field is missing
    #[error("Missing `{0}` field")]
    #[diagnostic(
        code(cavage::missing_field),
        help("`keyId`, `headers` and `signature` are mandatory")
    )]
    MissingField(&'static str),
}

#[derive(Debug, Logos)]
#[logos(skip r"[ \t]+")]
enum TokenTy {
    #[regex(r"\w+")]
    Key,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    Value,

    #[token(",")]
    Comma,
}

#[derive(Debug)]
struct Token {
    pub ty: TokenTy,
    pub span: Span,
}

impl Token {
    /// Lex the input. Errors carry the span of the input the lexer choked on.
    pub fn parse(input: &str) -> impl Iterator<Item = Result<Token, Span>> + '_ {
        TokenTy::lexer(input)
            .spanned()
            .map(|(ty, span)| ty.map(|ty| Token { ty, span: span.clone() }).map_err(|()| span))
    }
}

macro_rules! ensure {
    ($self:expr, $token:expr, $pattern:pat) => {{
        match $token {
            Some(Ok(token)) if matches!(token.ty, $pattern) => token,
            Some(Ok(token)) => {
                return Some(Err($self.fail(ParseError::UnexpectedToken {
                    span: token.span.into(),
                })));
            }
            Some(Err(span)) => {
                return Some(Err($self.fail(ParseError::UnexpectedToken {
                    span: span.into(),
                })));
            }
            None => {
                let end = $self.input.len();
                return Some(Err($self.fail(ParseError::UnexpectedEnd {
                    span: (end, 0).into(),
                })));
            }
        }
    }};
}

struct ParseIter<'a, I> {
    /// Stream of tokens wrapped into a result
    inner: I,

    /// Reference to the original input that was fed to the lexer
    input: &'a str,

    /// Marker whether we encountered any error or illegal token
    ///
    /// If we did, the iterator will stop yielding any results
    is_broken: bool,

    /// The last token was a comma, so another field has to follow
    needs_field: bool,
}

impl<I> ParseIter<'_, I> {
    fn fail(&mut self, error: ParseError) -> ParseError {
        self.is_broken = true;
        error
    }
}

impl<'a, I> Iterator for ParseIter<'a, I>
where
    I: Iterator<Item = Result<Token, Span>>,
{
    type Item = Result<(&'a str, &'a str), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_broken {
            return None;
        }

        // Running out of tokens at a field boundary is the regular end of the header
        let next = self.inner.next();
        if next.is_none() && !self.needs_field {
            return None;
        }

        let key = ensure!(self, next, TokenTy::Key);
        ensure!(self, self.inner.next(), TokenTy::Equals);
        let value = ensure!(self, self.inner.next(), TokenTy::Value);

        self.needs_field = false;
        if let Some(next) = self.inner.next() {
            ensure!(self, Some(next), TokenTy::Comma);
            self.needs_field = true;
        }

        let key = &self.input[key.span];
        let value = self.input[value.span].trim_matches('"');

        Some(Ok((key, value)))
    }
}

/// Parse a cavage `Signature` header into its fields
///
/// The `algorithm` field is optional and purely informational. Unknown fields are skipped.
#[inline]
pub fn parse(
    input: &str,
) -> Result<SignatureHeader<'_, impl Iterator<Item = &str> + Clone, &str>, ParseError> {
    let kv_iter = ParseIter {
        inner: Token::parse(input),
        input,
        is_broken: false,
        needs_field: false,
    };

    let mut key_id = None;
    let mut algorithm = None;
    let mut signature = None;
    let mut headers = None;

    for kv in kv_iter {
        let (key, value) = kv?;

        match key {
            "keyId" => key_id = Some(value),
            "algorithm" => algorithm = Some(value),
            "signature" => signature = Some(value),
            "headers" => headers = Some(value.split_whitespace()),
            _ => {
                // `created`, `expires` and friends. We only ever sign with the `Date` header.
            }
        }
    }

    Ok(SignatureHeader {
        key_id: key_id.ok_or(ParseError::MissingField("keyId"))?,
        algorithm,
        headers: headers.ok_or(ParseError::MissingField("headers"))?,
        signature: signature.ok_or(ParseError::MissingField("signature"))?,
    })
}

#[cfg(test)]
mod test {
    use super::{parse, ParseError};

    const HEADER: &str = r#"keyId="Test",algorithm="rsa-sha256",headers="(request-target) host date",signature="qdx+H7PHHDZgy4y/Ahn9Tny9V3GP6YgBPyUXMmoxWtLbHpUnXS2mg2+SbrQDMCJypxBLSPQR2aAjn7ndmw2iicw3HMbe8VfEdKFYRqzic+efkb3nndiv/x1xSHDJWeSWkx3ButlYSuBskLu6kd9Fswtemr3lgdDEmn04swr2Os0=""#;

    #[test]
    fn parse_header() {
        let header = parse(HEADER).unwrap();

        assert_eq!(header.key_id, "Test");
        assert_eq!(header.algorithm, Some("rsa-sha256"));
        assert_eq!(header.signature, "qdx+H7PHHDZgy4y/Ahn9Tny9V3GP6YgBPyUXMmoxWtLbHpUnXS2mg2+SbrQDMCJypxBLSPQR2aAjn7ndmw2iicw3HMbe8VfEdKFYRqzic+efkb3nndiv/x1xSHDJWeSWkx3ButlYSuBskLu6kd9Fswtemr3lgdDEmn04swr2Os0=");
        assert_eq!(
            header.headers.collect::<Vec<_>>(),
            ["(request-target)", "host", "date"]
        );
    }

    #[test]
    fn algorithm_is_optional() {
        let header = parse(r#"keyId="Test",headers="date",signature="abc""#).unwrap();
        assert_eq!(header.algorithm, None);
    }

    #[test]
    fn tolerates_whitespace() {
        let header = parse(r#"keyId="Test", headers="date" ,	signature="abc""#).unwrap();
        assert_eq!(header.key_id, "Test");
        assert_eq!(header.signature, "abc");
    }

    #[test]
    fn commas_inside_values() {
        let header = parse(r#"keyId="a,b",headers="date",signature="abc""#).unwrap();
        assert_eq!(header.key_id, "a,b");
    }

    #[test]
    fn skips_unknown_fields() {
        let header =
            parse(r#"keyId="Test",created="1402170695",headers="date",signature="abc""#).unwrap();
        assert_eq!(header.key_id, "Test");
    }

    #[test]
    fn missing_fields() {
        assert!(matches!(
            parse(r#"headers="date",signature="abc""#),
            Err(ParseError::MissingField("keyId"))
        ));
        assert!(matches!(
            parse(r#"keyId="Test",signature="abc""#),
            Err(ParseError::MissingField("headers"))
        ));
        assert!(matches!(
            parse(r#"keyId="Test",headers="date""#),
            Err(ParseError::MissingField("signature"))
        ));
    }

    #[test]
    fn unquoted_value() {
        let Err(ParseError::UnexpectedToken { span }) =
            parse(r#"keyId="Test",created=1402170695,headers="date",signature="abc""#)
        else {
            panic!("unquoted value was accepted");
        };

        assert_eq!(span.offset(), 21);
        assert_eq!(span.len(), 10);
    }

    #[test]
    fn unterminated_quote() {
        assert!(matches!(
            parse(r#"keyId="Test,headers="date",signature="abc""#),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn dangling_key() {
        assert!(matches!(
            parse(r#"keyId="Test",headers="date",signature="abc",foo"#),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn trailing_comma() {
        let Err(ParseError::UnexpectedEnd { span }) =
            parse(r#"keyId="a",headers="date",signature="x","#)
        else {
            panic!("trailing comma was accepted");
        };

        assert_eq!(span.offset(), 39);
    }

    #[test]
    fn missing_separator() {
        assert!(matches!(
            parse(r#"keyId="Test" headers="date",signature="abc""#),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(parse(""), Err(ParseError::MissingField(_))));
    }
}
