//! Output format and quality settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EncodeError;

/// Target container for exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    /// Valid quality range for this format.
    ///
    /// PNG takes a zlib-style compression level, the lossy formats a
    /// percentage.
    pub fn quality_range(self) -> (u8, u8) {
        match self {
            OutputFormat::Png => (0, 9),
            OutputFormat::Jpg | OutputFormat::Webp => (1, 100),
        }
    }

    /// Default quality when the host does not supply one.
    pub fn default_quality(self) -> u8 {
        match self {
            OutputFormat::Png => 6,
            OutputFormat::Jpg | OutputFormat::Webp => 90,
        }
    }

    /// Clamp a raw quality value into [`OutputFormat::quality_range`].
    pub fn clamp_quality(self, quality: u8) -> u8 {
        let (min, max) = self.quality_range();
        quality.clamp(min, max)
    }

    /// Reject a quality value outside [`OutputFormat::quality_range`].
    pub fn validate_quality(self, quality: u8) -> Result<u8, EncodeError> {
        let (min, max) = self.quality_range();
        if quality < min || quality > max {
            return Err(EncodeError::InvalidQuality {
                format: self,
                quality,
                min,
                max,
            });
        }
        Ok(quality)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encode parameters consumed at the final step of both pipelines.
///
/// The filename fields are carried through for the export collaborator; the
/// engine never builds filenames itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// PNG: compression level 0-9. JPG/WebP: percentage 1-100.
    pub quality: u8,
    pub maintain_original_name: bool,
    pub filename_prefix: String,
    pub filename_suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpg,
            quality: OutputFormat::Jpg.default_quality(),
            maintain_original_name: true,
            filename_prefix: String::new(),
            filename_suffix: String::new(),
        }
    }
}

impl OutputSettings {
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality,
            ..Self::default()
        }
    }

    /// Quality clamped to the format's range.
    pub fn effective_quality(&self) -> u8 {
        self.format.clamp_quality(self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_quality_clamps_to_compression_levels() {
        assert_eq!(OutputFormat::Png.clamp_quality(0), 0);
        assert_eq!(OutputFormat::Png.clamp_quality(9), 9);
        assert_eq!(OutputFormat::Png.clamp_quality(80), 9);
    }

    #[test]
    fn test_lossy_quality_clamps_to_percentage() {
        for format in [OutputFormat::Jpg, OutputFormat::Webp] {
            assert_eq!(format.clamp_quality(0), 1);
            assert_eq!(format.clamp_quality(55), 55);
            assert_eq!(format.clamp_quality(255), 100);
        }
    }

    #[test]
    fn test_validate_quality() {
        assert!(OutputFormat::Png.validate_quality(9).is_ok());
        assert!(matches!(
            OutputFormat::Png.validate_quality(10),
            Err(EncodeError::InvalidQuality { min: 0, max: 9, .. })
        ));
        assert!(OutputFormat::Jpg.validate_quality(0).is_err());
        assert!(OutputFormat::Webp.validate_quality(100).is_ok());
    }

    #[test]
    fn test_effective_quality_follows_format() {
        let settings = OutputSettings::new(OutputFormat::Png, 90);
        assert_eq!(settings.effective_quality(), 9);

        let settings = OutputSettings::new(OutputFormat::Jpg, 0);
        assert_eq!(settings.effective_quality(), 1);
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(OutputFormat::Jpg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Webp.mime_type(), "image/webp");
        assert_eq!(OutputFormat::Webp.to_string(), "webp");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!(matches!(
            "gif".parse::<OutputFormat>(),
            Err(EncodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: OutputSettings =
            serde_json::from_str(r#"{"format":"jpeg","quality":75,"filenamePrefix":"cut-"}"#)
                .unwrap();
        assert_eq!(settings.format, OutputFormat::Jpg);
        assert_eq!(settings.quality, 75);
        assert_eq!(settings.filename_prefix, "cut-");
        assert!(settings.maintain_original_name);
    }
}
