//! Byte-level decoding of inline media: base64, percent-encoding and `data:` URLs.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

/// Standard alphabet, padding optional, trailing bits ignored.
const TOLERANT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const DEFAULT_MIME: &str = "text/plain";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("not a data url")]
    NotDataUrl,

    #[error("data url has no ',' separator")]
    MissingSeparator,
}

/// Decodes standard base64, skipping ASCII whitespace and `=` padding wherever they
/// appear. Any other character outside the alphabet yields `None`.
pub fn base64_decode(input: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = input.iter().copied().filter(|b| !b.is_ascii_whitespace() && *b != b'=').collect();
    TOLERANT_STANDARD.decode(compact).ok()
}

/// Decodes `%XX` escapes and turns `+` into a space. Malformed escapes are kept as is.
pub fn percent_decode(input: &[u8]) -> Vec<u8> {
    let plus_as_space: Vec<u8> = input.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    urlencoding::decode_binary(&plus_as_space).into_owned()
}

/// `true` when `value` starts with the `data:` scheme (ASCII case-insensitive).
pub fn is_data_url(value: &str) -> bool {
    value.trim_start().get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// A parsed `data:<mime>[;base64],<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    mime: String,
    base64: bool,
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Splits a data URL into MIME type, base64 flag and payload.
    ///
    /// The MIME type is lower-cased and stripped of parameters; an empty MIME type
    /// means `text/plain`.
    pub fn parse(uri: &'a str) -> Result<Self, CodecError> {
        if !is_data_url(uri) {
            return Err(CodecError::NotDataUrl);
        }
        let rest = &uri.trim_start()[5..];
        let (meta, payload) = rest.split_once(',').ok_or(CodecError::MissingSeparator)?;

        let mut params = meta.split(';');
        let mime = params.next().map(str::trim).unwrap_or_default().to_ascii_lowercase();
        let base64 = params.any(|param| param.trim().eq_ignore_ascii_case("base64"));

        let mime = if mime.is_empty() { DEFAULT_MIME.to_string() } else { mime };
        Ok(Self { mime, base64, payload })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn is_base64(&self) -> bool {
        self.base64
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// The decoded bytes, or `None` when a base64 payload is invalid.
    pub fn decode(&self) -> Option<Vec<u8>> {
        if self.base64 { base64_decode(self.payload.as_bytes()) } else { Some(percent_decode(self.payload.as_bytes())) }
    }
}

/// File extension for a media type; unknown types map to `bin`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_tolerates_whitespace_and_padding() {
        assert_eq!(base64_decode(b"aGVsbG8="), Some(b"hello".to_vec()));
        assert_eq!(base64_decode(b"aGVs\r\n bG8"), Some(b"hello".to_vec()));
        assert_eq!(base64_decode(b"aGVsbA=="), Some(b"hell".to_vec()));
        assert_eq!(base64_decode(b""), Some(Vec::new()));
    }

    #[test]
    fn base64_rejects_foreign_characters() {
        assert_eq!(base64_decode(b"aGVs*bG8="), None);
        assert_eq!(base64_decode(b"aGVs-bG8"), None);
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode(b"a%20b+c"), b"a b c".to_vec());
        assert_eq!(percent_decode(b"%3Csvg%3E"), b"<svg>".to_vec());
        assert_eq!(percent_decode(b"100%"), b"100%".to_vec());
        assert_eq!(percent_decode(b"%2B"), b"+".to_vec());
    }

    #[test]
    fn parse_base64_data_url() {
        let url = DataUrl::parse("data:image/PNG;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(url.mime(), "image/png");
        assert!(url.is_base64());
        assert_eq!(url.payload(), "iVBORw0KGgo=");
        assert_eq!(url.decode().unwrap(), vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }

    #[test]
    fn parse_plain_data_url() {
        let url = DataUrl::parse("data:,Hello%2C%20World").unwrap();
        assert_eq!(url.mime(), "text/plain");
        assert!(!url.is_base64());
        assert_eq!(url.decode().unwrap(), b"Hello, World".to_vec());

        let svg = DataUrl::parse("data:image/svg+xml;charset=utf-8,%3Csvg%2F%3E").unwrap();
        assert_eq!(svg.mime(), "image/svg+xml");
        assert_eq!(svg.decode().unwrap(), b"<svg/>".to_vec());
    }

    #[test]
    fn parse_failures() {
        assert_eq!(DataUrl::parse("data:image/png;base64"), Err(CodecError::MissingSeparator));
        assert_eq!(DataUrl::parse("/uploads/a.png"), Err(CodecError::NotDataUrl));
        assert!(DataUrl::parse("data:image/png;base64,@@@").unwrap().decode().is_none());
    }

    #[test]
    fn mime_extensions() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(extension_for_mime("IMAGE/GIF"), "gif");
        assert_eq!(extension_for_mime("image/png; charset=binary"), "png");
        assert_eq!(extension_for_mime("application/pdf"), "bin");
    }

    #[test]
    fn data_url_detection() {
        assert!(is_data_url("data:image/png;base64,AAAA"));
        assert!(is_data_url("  DATA:text/plain,x"));
        assert!(!is_data_url("/uploads/x.png"));
        assert!(!is_data_url("dat"));
    }
}
