use bytes::{Buf, Bytes};

/// One unit produced by the request decoder or consumed by the response encoder:
/// either the header of a message or a piece of its payload.
pub enum Message<T, Data: Buf = Bytes> {
    Header(T),
    Payload(PayloadItem<Data>),
}

/// A piece of payload, or the marker that no more payload follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    Eof,
}

/// The number of body bytes announced by a header.
///
/// Only `Content-Length` framing is supported, so a body either has a known
/// length or is absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    Length(u64),
    Empty,
}

impl PayloadSize {
    /// Builds the size from a `Content-Length` value, mapping zero to [`PayloadSize::Empty`].
    #[inline]
    pub fn from_length(length: u64) -> Self {
        if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// The announced length, zero for an empty payload.
    #[inline]
    pub fn length(&self) -> u64 {
        match self {
            PayloadSize::Length(length) => *length,
            PayloadSize::Empty => 0,
        }
    }
}

impl<T, D: Buf> Message<T, D> {
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    /// Returns the payload item, or `None` if this is a header.
    pub fn into_payload_item(self) -> Option<PayloadItem<D>> {
        match self {
            Message::Header(_) => None,
            Message::Payload(payload_item) => Some(payload_item),
        }
    }
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(PayloadSize::from_length(0), PayloadSize::Empty);
        assert_eq!(PayloadSize::from_length(12), PayloadSize::Length(12));
        assert_eq!(PayloadSize::Empty.length(), 0);
    }

    #[test]
    fn payload_message_accessors() {
        let message: Message<()> = Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"abc")));
        assert!(!message.is_header());

        let item = message.into_payload_item().unwrap();
        assert!(item.is_chunk());
        assert_eq!(item.as_bytes().map(|b| &b[..]), Some(&b"abc"[..]));

        assert_eq!(Message::<(), Bytes>::Header(()).into_payload_item(), None);
    }
}
