use bytes::Bytes;
use http_body::{Frame, SizeHint};
use std::{
    borrow::Cow,
    convert::Infallible,
    fmt::{self, Debug},
    pin::Pin,
    task::{self, Poll},
};

/// Request body
///
/// Always fully buffered. Signed requests need the whole payload to compute the digest anyway.
#[derive(Clone, Default)]
pub struct Body {
    data: Option<Bytes>,
}

impl Body {
    /// Empty body
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self { data: None }
    }

    /// Single byte chunk body
    #[inline]
    pub fn data<D>(data: D) -> Self
    where
        D: Into<Bytes>,
    {
        Self {
            data: Some(data.into()),
        }
    }

    /// Bytes that haven't been sent yet
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }
}

impl AsRef<[u8]> for Body {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Debug for Body {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(std::any::type_name::<Self>())
            .field("len", &self.as_bytes().len())
            .finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    #[inline]
    fn from(value: Bytes) -> Self {
        Self::data(value)
    }
}

impl From<Cow<'_, str>> for Body {
    #[inline]
    fn from(value: Cow<'_, str>) -> Self {
        Self::data(value.into_owned())
    }
}

impl From<String> for Body {
    #[inline]
    fn from(value: String) -> Self {
        Self::data(value)
    }
}

impl From<Vec<u8>> for Body {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::data(value)
    }
}

impl From<&'static [u8]> for Body {
    #[inline]
    fn from(value: &'static [u8]) -> Self {
        Self::data(value)
    }
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = Infallible;

    #[inline]
    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().data.take().map(|data| Ok(Frame::data(data))))
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.as_bytes().len() as u64)
    }
}
