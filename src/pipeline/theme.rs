//! Colour transform applied to each rasterised page.
//!
//! Only one theme actually changes pixels today: `pure-black` inverts every
//! channel so white paper becomes true black (pixels fully off on AMOLED
//! panels) and black text becomes white. Every other identifier is accepted
//! and passed through untouched, so a client sending a theme this build does
//! not know about still gets a valid document back.

use crate::raster::RasterBuffer;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Identifier of the inverting theme.
pub const PURE_BLACK: &str = "pure-black";

/// A named visual theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    /// Full channel inversion. (default)
    #[default]
    PureBlack,
    /// Any other identifier; pixels are left as rendered.
    Passthrough(String),
}

impl Theme {
    /// Resolve a theme identifier. Matching is exact and case-sensitive.
    pub fn from_id(id: &str) -> Self {
        if id == PURE_BLACK {
            Theme::PureBlack
        } else {
            Theme::Passthrough(id.to_string())
        }
    }

    /// The identifier this theme was created from.
    pub fn id(&self) -> &str {
        match self {
            Theme::PureBlack => PURE_BLACK,
            Theme::Passthrough(id) => id,
        }
    }

    /// Whether [`apply`] changes pixels for this theme.
    pub fn transforms_pixels(&self) -> bool {
        matches!(self, Theme::PureBlack)
    }
}

impl FromStr for Theme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Theme::from_id(s))
    }
}

impl From<String> for Theme {
    fn from(id: String) -> Self {
        if id == PURE_BLACK {
            Theme::PureBlack
        } else {
            Theme::Passthrough(id)
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::PureBlack => PURE_BLACK.to_string(),
            Theme::Passthrough(id) => id,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Apply `theme` to `buffer` in place.
pub fn apply(buffer: &mut RasterBuffer, theme: &Theme) {
    match theme {
        Theme::PureBlack => {
            // RGB8 has no alpha channel; for RGBA images `invert` leaves
            // alpha alone as well.
            image::imageops::invert(buffer.as_image_mut());
        }
        Theme::Passthrough(id) => {
            debug!("Theme '{}' leaves pixels unchanged", id);
        }
    }
}
