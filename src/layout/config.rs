//! Layout configuration
//!
//! All spacing constants of the block layout live in one serde struct so a
//! host can load them from JSON and scale them with the user's code size
//! preference.

use serde::{Deserialize, Serialize};

/// Spacing constants for block layout, every field in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal gap between slots of a line and around literals
    pub inner_padding_horizontal: f32,
    /// Vertical gap above and below slots of a line
    pub inner_padding_vertical: f32,
    /// Horizontal inset of a child block inside its socket or sequence
    pub element_padding_horizontal: f32,
    /// Vertical inset of a child block, and the gap between sequence elements
    pub element_padding_vertical: f32,
    /// Width of an empty socket placeholder
    pub empty_field_width: f32,
    /// Height of an empty socket placeholder
    pub empty_field_height: f32,
    /// Width of the connector rail drawn left of a nested sequence
    pub rail_width: f32,
    /// Width of the closing line drawn under a trailing sequence
    pub closing_line_width: f32,
    /// Font size of block text
    pub text_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            inner_padding_horizontal: 10.0,
            inner_padding_vertical: 6.0,
            element_padding_horizontal: 4.0,
            element_padding_vertical: 4.0,
            empty_field_width: 28.0,
            empty_field_height: 20.0,
            rail_width: 16.0,
            closing_line_width: 60.0,
            text_size: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Example
    /// ```
    /// use block_editor::layout::LayoutConfig;
    ///
    /// let config = LayoutConfig::from_json(r#"{"rail_width": 24}"#).unwrap();
    /// assert_eq!(config.rail_width, 24.0);
    /// assert_eq!(config.text_size, LayoutConfig::default().text_size);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Largest empty socket a plugged child can never undercut
    ///
    /// The narrowest block is either a line of empty labels (two inner
    /// paddings) or a bare sequence line (rail plus element padding); the
    /// flattest has a single line of text. A child also carries element
    /// padding on both sides, so a placeholder within these bounds never
    /// shrinks its block when something is plugged in.
    ///
    /// # Returns
    /// `(width, height)` upper bounds for the empty socket placeholder
    pub fn empty_field_limit(&self) -> (f32, f32) {
        let narrowest = (2.0 * self.inner_padding_horizontal)
            .min(self.rail_width + self.element_padding_horizontal);
        (
            narrowest + 2.0 * self.element_padding_horizontal,
            2.0 * (self.inner_padding_vertical + self.element_padding_vertical),
        )
    }

    /// Scale every constant by `percent / 100`, truncating to whole pixels
    ///
    /// The empty socket is clamped to [`LayoutConfig::empty_field_limit`] of
    /// the scaled paddings.
    pub fn scaled(&self, percent: u32) -> Self {
        let mult = percent as f32 / 100.0;
        let scale = |v: f32| (v * mult).trunc();
        let mut scaled = Self {
            inner_padding_horizontal: scale(self.inner_padding_horizontal),
            inner_padding_vertical: scale(self.inner_padding_vertical),
            element_padding_horizontal: scale(self.element_padding_horizontal),
            element_padding_vertical: scale(self.element_padding_vertical),
            empty_field_width: scale(self.empty_field_width),
            empty_field_height: scale(self.empty_field_height),
            rail_width: scale(self.rail_width),
            closing_line_width: scale(self.closing_line_width),
            text_size: scale(self.text_size),
        };
        let (max_width, max_height) = scaled.empty_field_limit();
        scaled.empty_field_width = scaled.empty_field_width.min(max_width);
        scaled.empty_field_height = scaled.empty_field_height.min(max_height);
        scaled
    }

    /// Reject negative spacing, non-positive text size and empty sockets
    /// larger than [`LayoutConfig::empty_field_limit`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spacing = [
            ("inner_padding_horizontal", self.inner_padding_horizontal),
            ("inner_padding_vertical", self.inner_padding_vertical),
            ("element_padding_horizontal", self.element_padding_horizontal),
            ("element_padding_vertical", self.element_padding_vertical),
            ("empty_field_width", self.empty_field_width),
            ("empty_field_height", self.empty_field_height),
            ("rail_width", self.rail_width),
            ("closing_line_width", self.closing_line_width),
        ];
        for (name, value) in spacing {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be >= 0, got {}", name, value)));
            }
        }
        if !self.text_size.is_finite() || self.text_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "text_size must be > 0, got {}",
                self.text_size
            )));
        }

        let (max_width, max_height) = self.empty_field_limit();
        if self.empty_field_width > max_width {
            return Err(ConfigError::Invalid(format!(
                "empty_field_width must be <= {} so plugged blocks never shrink a socket, got {}",
                max_width, self.empty_field_width
            )));
        }
        if self.empty_field_height > max_height {
            return Err(ConfigError::Invalid(format!(
                "empty_field_height must be <= {} so plugged blocks never shrink a socket, got {}",
                max_height, self.empty_field_height
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid layout config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid layout config: {0}")]
    Invalid(String),
}
