use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-element packing parameters carried by every atlas command.
/// Key notes:
///   - `default_dpi` must be nonzero; it is the density assumed when neither the
///     command nor the filename names one
///   - `trim`/`trim_margin`/`transparency_threshold` are forwarded untouched to the layout stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AtlasElementConfig {
    /// Density the source art was authored for.
    #[serde(default = "default_dpi")]
    pub default_dpi: u16,
    /// Extrude edge pixels of the element (for sampling safety).
    #[serde(default)]
    pub extrude: u16,
    /// Trim transparent borders (alpha <= transparency_threshold).
    #[serde(default = "default_trim")]
    pub trim: bool,
    /// Pixels of transparent border kept after trimming.
    #[serde(default)]
    pub trim_margin: u16,
    #[serde(default = "default_transparency_threshold")]
    pub transparency_threshold: u8,
    /// Pixels between this element and its neighbours.
    #[serde(default = "default_shape_padding")]
    pub shape_padding: u16,
    /// Pixels between this element and the page border.
    #[serde(default)]
    pub border_padding: u16,
}

impl Default for AtlasElementConfig {
    fn default() -> Self {
        Self {
            default_dpi: default_dpi(),
            extrude: 0,
            trim: default_trim(),
            trim_margin: 0,
            transparency_threshold: default_transparency_threshold(),
            shape_padding: default_shape_padding(),
            border_padding: 0,
        }
    }
}

impl AtlasElementConfig {
    pub fn is_valid(&self) -> bool {
        self.default_dpi != 0
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if `default_dpi` is zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.is_valid() {
            return Err(crate::error::AtlasPrepError::InvalidConfig(
                "default_dpi can not be 0".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `AtlasElementConfig`.
    pub fn builder() -> AtlasElementConfigBuilder {
        AtlasElementConfigBuilder::new()
    }
}

fn default_dpi() -> u16 {
    160
}
fn default_trim() -> bool {
    true
}
fn default_transparency_threshold() -> u8 {
    1
}
fn default_shape_padding() -> u16 {
    2
}

/// Builder for `AtlasElementConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasElementConfigBuilder {
    cfg: AtlasElementConfig,
}

impl AtlasElementConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasElementConfig::default(),
        }
    }
    pub fn default_dpi(mut self, v: u16) -> Self {
        self.cfg.default_dpi = v;
        self
    }
    pub fn extrude(mut self, v: u16) -> Self {
        self.cfg.extrude = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_margin(mut self, v: u16) -> Self {
        self.cfg.trim_margin = v;
        self
    }
    pub fn transparency_threshold(mut self, v: u8) -> Self {
        self.cfg.transparency_threshold = v;
        self
    }
    pub fn shape_padding(mut self, v: u16) -> Self {
        self.cfg.shape_padding = v;
        self
    }
    pub fn border_padding(mut self, v: u16) -> Self {
        self.cfg.border_padding = v;
        self
    }
    pub fn build(self) -> AtlasElementConfig {
        self.cfg
    }
}

/// Set of accepted image file extensions, stored uppercased so membership
/// checks are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageExtensions {
    upper: HashSet<String>,
}

impl ImageExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let upper = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_uppercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { upper }
    }

    /// `ext` may be given with or without the leading dot.
    pub fn contains(&self, ext: &str) -> bool {
        self.upper
            .contains(&ext.trim_start_matches('.').to_ascii_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::new(["png", "jpg", "jpeg", "bmp", "tga"])
    }
}
