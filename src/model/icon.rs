// Copyright 2025 the Splitbench Authors
// SPDX-License-Identifier: Apache-2.0

//! Game and segment icons.
//!
//! Each `Icon` carries a process-unique `IconId` generated from a global
//! atomic counter. The editor compares ids, never image bytes, to decide
//! whether a slot's icon changed since the last snapshot. Ids are never
//! reused, so a replaced icon can't be mistaken for its predecessor.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::settings;

/// A unique identifier for an icon image
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IconId(u64);

static ICON_COUNTER: AtomicU64 = AtomicU64::new(1);

impl IconId {
    /// Create a new unique icon ID
    pub fn next() -> Self {
        Self(ICON_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Why a byte buffer was refused as an icon
#[derive(Debug, Error)]
pub enum IconError {
    #[error("icon data is empty")]
    Empty,
    #[error("icon data is {0} bytes, larger than the allowed maximum")]
    TooLarge(usize),
    #[error("icon data is not a readable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Encoded image bytes with a MIME type sniffed from their header
#[derive(Debug, Clone)]
pub struct Icon {
    id: IconId,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl Icon {
    /// Validate raw file bytes as an icon.
    ///
    /// The bytes must decode as one of the enabled image formats; the
    /// decoded pixels are thrown away, only the original encoding is kept.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IconError> {
        if bytes.is_empty() {
            return Err(IconError::Empty);
        }
        if bytes.len() > settings::icons::MAX_BYTES {
            return Err(IconError::TooLarge(bytes.len()));
        }
        let format = image::guess_format(bytes)?;
        image::load_from_memory_with_format(bytes, format)?;

        Ok(Self {
            id: IconId::next(),
            mime: format.to_mime_type(),
            bytes: bytes.to_vec(),
        })
    }

    pub fn id(&self) -> IconId {
        self.id
    }

    /// Data URL suitable for an `<img src>` or any URL-based image view
    pub fn url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

// Two icons are equal when they hold the same image. The id only tracks
// which icons the editor has reported.
impl PartialEq for Icon {
    fn eq(&self, other: &Self) -> bool {
        self.mime == other.mime && self.bytes == other.bytes
    }
}

impl Eq for Icon {}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.bytes))
    }
}

impl<'de> Deserialize<'de> for Icon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)?;
        Icon::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Encode a tiny PNG for tests
#[cfg(test)]
pub(crate) fn test_png(shade: u8) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]))
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
