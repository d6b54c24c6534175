//! Blueprint text envelope
//!
//! ```text
//! BLUEPRINT:0,<layout>,<icon0>,..,<icon4>,0,<timestamp>,<game_version>,<short_desc>[,<long_desc>]"<base64>"<hash>
//! ```
//!
//! The base64 body is a gzip stream holding the binary payload. The hash
//! covers everything before the final quote; the digest function itself is
//! supplied by the caller through [`BlueprintHasher`].

use std::io::{Read, Write};
use std::path::Path;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use super::data::{BlueprintData, DecodeOptions};
use crate::error::{Error, Result};

const MAGIC: &str = "BLUEPRINT:";
pub const ICON_COUNT: usize = 5;

/// Digest over the signed part of a blueprint text
pub trait BlueprintHasher {
    /// Returns the digest as hex text
    fn digest(&self, signed: &[u8]) -> Result<String>;
}

impl<F> BlueprintHasher for F
where
    F: Fn(&[u8]) -> Result<String>,
{
    fn digest(&self, signed: &[u8]) -> Result<String> {
        self(signed)
    }
}

#[derive(Clone, Copy)]
pub enum Validation<'a> {
    Verify(&'a dyn BlueprintHasher),
    /// Accept the text whatever its hash
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    layout: u32,
    icons: [u32; ICON_COUNT],
    timestamp: u64,
    game_version: String,
    short_desc: String,
    long_desc: Option<String>,
    payload: Vec<u8>,
    // Verbatim text while the corresponding part is untouched
    head: Option<String>,
    body: Option<String>,
    hash: Option<String>,
    // Whitespace that followed the hash, e.g. a file's final newline
    trailer: String,
}

impl Envelope {
    pub fn new(layout: u32, game_version: &str, payload: Vec<u8>) -> Self {
        Self {
            layout,
            icons: [0; ICON_COUNT],
            timestamp: 0,
            game_version: game_version.to_string(),
            short_desc: String::new(),
            long_desc: None,
            payload,
            head: None,
            body: None,
            hash: None,
            trailer: String::new(),
        }
    }

    pub fn parse(text: &str, validation: Validation<'_>) -> Result<Self> {
        let content = text.trim_end();
        let trailer = &text[content.len()..];
        let text = content.trim_start();
        let invalid = |msg: &str| Error::InvalidEnvelope(msg.to_string());

        let last_quote = text.rfind('"').ok_or_else(|| invalid("missing closing quote"))?;
        let (signed, hash) = (&text[..last_quote], &text[last_quote + 1..]);
        let first_quote = signed.find('"').ok_or_else(|| invalid("missing opening quote"))?;
        let (head, body) = (&signed[..first_quote], &signed[first_quote + 1..]);

        let fields = head.strip_prefix(MAGIC).ok_or_else(|| invalid("missing BLUEPRINT: prefix"))?;
        let fields: Vec<&str> = fields.splitn(12, ',').collect();
        if fields.len() < 11 {
            return Err(Error::InvalidEnvelope(format!("expected at least 11 header fields, got {}", fields.len())));
        }

        if let Validation::Verify(hasher) = validation {
            let actual = hasher.digest(signed.as_bytes())?;
            if !actual.eq_ignore_ascii_case(hash) {
                return Err(Error::ChecksumMismatch { expected: hash.to_string(), actual });
            }
        }

        let mut icons = [0; ICON_COUNT];
        for (icon, field) in icons.iter_mut().zip(&fields[2..2 + ICON_COUNT]) {
            *icon = parse_number(field, "icon")?;
        }

        let compressed = BASE64_STANDARD.decode(body)?;
        let payload = gunzip(&compressed)?;
        debug!(
            "Envelope: {} base64 chars, {} compressed, {} payload bytes",
            body.len(),
            compressed.len(),
            payload.len()
        );

        Ok(Self {
            layout: parse_number(fields[1], "layout")?,
            icons,
            timestamp: parse_number(fields[8], "timestamp")?,
            game_version: fields[9].to_string(),
            short_desc: percent_decode(fields[10])?,
            long_desc: fields.get(11).map(|d| percent_decode(d)).transpose()?,
            payload,
            head: Some(head.to_string()),
            body: Some(body.to_string()),
            hash: Some(hash.to_string()),
            trailer: trailer.to_string(),
        })
    }

    pub fn read_from_file(path: &Path, validation: Validation<'_>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, validation)
    }

    /// Render the text. A hasher is required once anything was changed;
    /// untouched envelopes reuse their original hash.
    pub fn to_text(&self, hasher: Option<&dyn BlueprintHasher>) -> Result<String> {
        let head = match &self.head {
            Some(head) => head.clone(),
            None => self.render_head(),
        };
        let body = match &self.body {
            Some(body) => body.clone(),
            None => BASE64_STANDARD.encode(gzip(&self.payload)?),
        };

        let signed = format!("{}\"{}", head, body);
        let hash = match (&self.hash, hasher) {
            (Some(hash), _) => hash.clone(),
            (None, Some(hasher)) => hasher.digest(signed.as_bytes())?.to_ascii_uppercase(),
            (None, None) => {
                return Err(Error::InvalidEnvelope("modified blueprint needs a hasher to be signed".into()));
            }
        };
        Ok(format!("{}\"{}{}", signed, hash, self.trailer))
    }

    pub fn write_to_file(&self, path: &Path, hasher: Option<&dyn BlueprintHasher>) -> Result<()> {
        std::fs::write(path, self.to_text(hasher)?)?;
        Ok(())
    }

    fn render_head(&self) -> String {
        let mut head = format!("{}0,{}", MAGIC, self.layout);
        for icon in &self.icons {
            head.push_str(&format!(",{}", icon));
        }
        head.push_str(&format!(
            ",0,{},{},{}",
            self.timestamp,
            self.game_version,
            percent_encode(&self.short_desc)
        ));
        if let Some(long_desc) = &self.long_desc {
            head.push(',');
            head.push_str(&percent_encode(long_desc));
        }
        head
    }

    fn touch_head(&mut self) {
        self.head = None;
        self.hash = None;
    }

    pub fn layout(&self) -> u32 {
        self.layout
    }

    pub fn set_layout(&mut self, layout: u32) {
        self.layout = layout;
        self.touch_head();
    }

    pub fn icons(&self) -> &[u32; ICON_COUNT] {
        &self.icons
    }

    pub fn set_icons(&mut self, icons: [u32; ICON_COUNT]) {
        self.icons = icons;
        self.touch_head();
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn game_version(&self) -> &str {
        &self.game_version
    }

    pub fn short_desc(&self) -> &str {
        &self.short_desc
    }

    pub fn set_short_desc(&mut self, desc: &str) {
        self.short_desc = desc.to_string();
        self.touch_head();
    }

    pub fn long_desc(&self) -> Option<&str> {
        self.long_desc.as_deref()
    }

    pub fn set_long_desc(&mut self, desc: &str) {
        self.long_desc = Some(desc.to_string());
        self.touch_head();
    }

    /// Decompressed binary payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) {
        if payload != self.payload {
            self.payload = payload;
            self.body = None;
            self.hash = None;
        }
    }

    /// Take the buildings of `other`, keeping this envelope's descriptions and icons
    pub fn replace_payload(&mut self, other: &Envelope) {
        self.set_payload(other.payload.clone());
    }

    pub fn data(&self) -> Result<BlueprintData> {
        BlueprintData::deserialize(&self.payload)
    }

    pub fn data_with(&self, options: DecodeOptions) -> Result<BlueprintData> {
        BlueprintData::deserialize_with(&self.payload, options)
    }

    pub fn set_data(&mut self, data: &BlueprintData) -> Result<()> {
        self.set_payload(data.serialize()?);
        Ok(())
    }

    /// True when `to_text` would reproduce the parsed text exactly
    pub fn is_pristine(&self) -> bool {
        self.hash.is_some()
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, name: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| Error::InvalidEnvelope(format!("bad {} field: {:?}", name, field)))
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Escape everything outside the RFC 3986 unreserved set
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn percent_decode(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| Error::InvalidEnvelope(format!("bad escape in {:?}", text)))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| Error::InvalidEnvelope(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Stand-in digest: byte sum, enough to tell texts apart
    fn sum_hasher(signed: &[u8]) -> Result<String> {
        let sum: u64 = signed.iter().map(|&b| u64::from(b)).sum();
        Ok(format!("{:032X}", sum))
    }

    fn sample_text() -> String {
        let mut envelope = Envelope::new(10, "0.9.27.15033", vec![1, 2, 3, 4, 5]);
        envelope.icons = [2303, 0, 0, 0, 0];
        envelope.timestamp = 638000000000000000;
        envelope.short_desc = "Gear factory".to_string();
        envelope.long_desc = Some("60/s, needs iron".to_string());
        envelope.to_text(Some(&sum_hasher)).unwrap()
    }

    #[test]
    fn test_parse() {
        let text = sample_text();
        assert!(text.starts_with("BLUEPRINT:0,10,2303,0,0,0,0,0,638000000000000000,0.9.27.15033,Gear%20factory,60%2Fs%2C%20needs%20iron\""));

        let envelope = Envelope::parse(&text, Validation::Verify(&sum_hasher)).unwrap();
        assert_eq!(envelope.layout(), 10);
        assert_eq!(envelope.icons()[0], 2303);
        assert_eq!(envelope.timestamp(), 638000000000000000);
        assert_eq!(envelope.game_version(), "0.9.27.15033");
        assert_eq!(envelope.short_desc(), "Gear factory");
        assert_eq!(envelope.long_desc(), Some("60/s, needs iron"));
        assert_eq!(envelope.payload(), &[1, 2, 3, 4, 5]);
        assert!(envelope.is_pristine());
    }

    #[test]
    fn test_untouched_text_is_reproduced() {
        let text = sample_text();
        let envelope = Envelope::parse(&text, Validation::Ignore).unwrap();
        assert_eq!(envelope.to_text(None).unwrap(), text);
    }

    #[test]
    fn test_trailing_newline_is_kept() {
        for ending in ["\n", "\r\n"] {
            let text = format!("{}{}", sample_text(), ending);
            let envelope = Envelope::parse(&text, Validation::Verify(&sum_hasher)).unwrap();
            assert_eq!(envelope.to_text(None).unwrap(), text);

            let mut edited = envelope.clone();
            edited.set_short_desc("Renamed");
            assert!(edited.to_text(Some(&sum_hasher)).unwrap().ends_with(ending));
        }
    }

    #[test]
    fn test_file_round_trip_is_byte_exact() {
        let path = std::env::temp_dir().join(format!("dspbp-envelope-{}.txt", std::process::id()));
        let text = format!("{}\n", sample_text());
        std::fs::write(&path, &text).unwrap();

        let envelope = Envelope::read_from_file(&path, Validation::Ignore).unwrap();
        envelope.write_to_file(&path, None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_without_long_desc() {
        let mut envelope = Envelope::new(10, "0.8.19.7757", vec![9]);
        envelope.short_desc = "x".to_string();
        let text = envelope.to_text(Some(&sum_hasher)).unwrap();
        let parsed = Envelope::parse(&text, Validation::Verify(&sum_hasher)).unwrap();
        assert_eq!(parsed.short_desc(), "x");
        assert_eq!(parsed.long_desc(), None);
    }

    #[test]
    fn test_checksum_mismatch() {
        let text = sample_text().replacen("Gear", "Cear", 1);
        match Envelope::parse(&text, Validation::Verify(&sum_hasher)) {
            Err(Error::ChecksumMismatch { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(Envelope::parse(&text, Validation::Ignore).is_ok());
    }

    #[test]
    fn test_edit_requires_hasher() {
        let mut envelope = Envelope::parse(&sample_text(), Validation::Ignore).unwrap();
        envelope.set_short_desc("Renamed");
        assert!(!envelope.is_pristine());
        assert!(matches!(envelope.to_text(None), Err(Error::InvalidEnvelope(_))));

        let text = envelope.to_text(Some(&sum_hasher)).unwrap();
        let reparsed = Envelope::parse(&text, Validation::Verify(&sum_hasher)).unwrap();
        assert_eq!(reparsed.short_desc(), "Renamed");
        assert_eq!(reparsed.payload(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_replace_payload_keeps_descriptions() {
        let mut target = Envelope::parse(&sample_text(), Validation::Ignore).unwrap();
        let source = Envelope::new(10, "0.9.27.15033", vec![7, 7, 7]);
        target.replace_payload(&source);

        let text = target.to_text(Some(&sum_hasher)).unwrap();
        let reparsed = Envelope::parse(&text, Validation::Verify(&sum_hasher)).unwrap();
        assert_eq!(reparsed.payload(), &[7, 7, 7]);
        assert_eq!(reparsed.short_desc(), "Gear factory");
        assert_eq!(reparsed.icons()[0], 2303);
    }

    #[test]
    fn test_same_payload_stays_pristine() {
        let mut envelope = Envelope::parse(&sample_text(), Validation::Ignore).unwrap();
        envelope.set_payload(vec![1, 2, 3, 4, 5]);
        assert!(envelope.is_pristine());
    }

    #[test]
    fn test_malformed() {
        for text in ["", "BLUEPRINT:0,10\"AAAA\"00", "NOTABLUEPRINT\"AAAA\"00", "BLUEPRINT:0,x,0,0,0,0,0,0,0,v,d\"H4sI\"00"] {
            assert!(Envelope::parse(text, Validation::Ignore).is_err(), "{:?}", text);
        }
    }

    #[test]
    fn test_percent_coding() {
        assert_eq!(percent_encode("a b/ü"), "a%20b%2F%C3%BC");
        assert_eq!(percent_decode("a%20b%2F%C3%BC").unwrap(), "a b/ü");
        assert_eq!(percent_decode("plain").unwrap(), "plain");
        assert!(percent_decode("bad%2").is_err());
        assert!(percent_decode("bad%zz").is_err());
    }
}
