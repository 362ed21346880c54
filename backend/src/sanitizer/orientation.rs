//! Upright correction from the EXIF `Orientation` tag
//!
//! Each of the eight tag values is a clockwise rotation by whole quarter
//! turns, optionally followed by a left-right mirror.

use std::io::Cursor;

use image::DynamicImage;

/// Pixel transform that makes a stored image display upright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upright {
    quarter_turns: u8,
    mirror: bool,
}

impl Upright {
    /// No change
    pub const IDENTITY: Self = Self::new(0, false);

    const fn new(quarter_turns: u8, mirror: bool) -> Self {
        Self {
            quarter_turns,
            mirror,
        }
    }

    /// Transform for an EXIF orientation value, `None` outside 1..=8
    #[must_use]
    pub const fn from_exif(tag: u32) -> Option<Self> {
        let (quarter_turns, mirror) = match tag {
            1 => (0, false),
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => return None,
        };
        Some(Self::new(quarter_turns, mirror))
    }

    /// Transform recorded in the primary image's EXIF data, if the container has any
    #[must_use]
    pub fn read(raw: &[u8]) -> Option<Self> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(raw))
            .ok()?;
        let tag = exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
            .value
            .get_uint(0)?;

        Self::from_exif(tag)
    }

    /// Rotates, then mirrors, `img`
    #[must_use]
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        let turned = match self.quarter_turns {
            1 => img.rotate90(),
            2 => img.rotate180(),
            3 => img.rotate270(),
            _ => img,
        };

        if self.mirror {
            turned.fliph()
        } else {
            turned
        }
    }
}
