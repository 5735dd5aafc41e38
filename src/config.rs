//! Configuration types for PDF dark-mode conversion.
//!
//! All per-request behaviour is controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. The defaults are the service
//! defaults: `pure-black` theme, no eye-care tint, every page, 1.5× raster,
//! compacted output.

use crate::error::DarkPdfError;
use crate::pipeline::pages::ALL_PAGES;
use crate::pipeline::render::{DEFAULT_SCALE, SCALE_RANGE};
use crate::pipeline::theme::Theme;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for one dark-mode conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use darkpdf::{ConversionConfig, Theme};
///
/// let config = ConversionConfig::builder()
///     .theme(Theme::PureBlack)
///     .eye_care(true)
///     .pages("1-3,7")
///     .build()
///     .unwrap();
/// assert_eq!(config.pages, "1-3,7");
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Visual theme. Default: [`Theme::PureBlack`].
    ///
    /// Unknown identifiers are accepted and leave colours untouched.
    pub theme: Theme,

    /// Composite the warm eye-care tint over every page. Default: false.
    pub eye_care: bool,

    /// Page spec: `all`, `5`, `3-15`, `1,3,5-7`. Default: `all`.
    ///
    /// An unparsable spec selects every page rather than failing.
    pub pages: String,

    /// Raster zoom factor, pixels per point. Range: 0.25–4.0. Default: 1.5.
    pub scale: f32,

    /// Prune unused objects and compress streams on save. Default: true.
    pub compact: bool,

    /// PDF user password for encrypted documents.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            eye_care: false,
            pages: ALL_PAGES.to_string(),
            scale: DEFAULT_SCALE,
            compact: true,
            password: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("theme", &self.theme)
            .field("eye_care", &self.eye_care)
            .field("pages", &self.pages)
            .field("scale", &self.scale)
            .field("compact", &self.compact)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    /// Set the theme from its identifier, e.g. `"pure-black"`.
    pub fn theme_id(mut self, id: &str) -> Self {
        self.config.theme = Theme::from_id(id);
        self
    }

    pub fn eye_care(mut self, v: bool) -> Self {
        self.config.eye_care = v;
        self
    }

    pub fn pages(mut self, spec: impl Into<String>) -> Self {
        self.config.pages = spec.into();
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = if scale.is_finite() {
            scale.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end())
        } else {
            scale
        };
        self
    }

    pub fn compact(mut self, v: bool) -> Self {
        self.config.compact = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DarkPdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl ConversionConfig {
    /// Check the constraints the builder enforces, for configs that were
    /// deserialised or edited field by field.
    pub fn validate(&self) -> Result<(), DarkPdfError> {
        if !SCALE_RANGE.contains(&self.scale) {
            return Err(DarkPdfError::InvalidConfig(format!(
                "Scale must be {}–{}, got {}",
                SCALE_RANGE.start(),
                SCALE_RANGE.end(),
                self.scale
            )));
        }
        Ok(())
    }
}
