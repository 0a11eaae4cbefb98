use serde::Deserialize;
use std::fmt;

/// One required icon variant, as listed in a manifest.
///
/// Only `size` and `idiom` are required; `scale` defaults to `1x` when
/// absent.  `role` and `subtype` are carried through untouched.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct IconSpec {
    size: String,
    idiom: String,
    #[serde(default)]
    scale: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
}

impl IconSpec {
    /// Creates a spec with the given nominal size, idiom and scale.
    pub fn new(size: &str, idiom: &str, scale: Option<&str>) -> IconSpec {
        IconSpec {
            size: size.to_string(),
            idiom: idiom.to_string(),
            scale: scale.map(str::to_string),
            role: None,
            subtype: None,
        }
    }

    /// Returns a copy of this spec with the given role and subtype.
    pub fn with_role(mut self,
                     role: Option<&str>,
                     subtype: Option<&str>)
                     -> IconSpec {
        self.role = role.map(str::to_string);
        self.subtype = subtype.map(str::to_string);
        self
    }

    /// The nominal size string, e.g. `"20x20"` or `"1024"`.
    pub fn size(&self) -> &str {
        &self.size
    }

    /// The platform class this icon targets (`"iphone"`, `"mac"`, ...).
    pub fn idiom(&self) -> &str {
        &self.idiom
    }

    /// The scale string as written in the manifest, if any.
    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    /// Optional role (e.g. `"notificationCenter"`).
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Optional subtype (e.g. `"38mm"`).
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Returns the multiplier from points to pixels.  Only the leading
    /// character of the scale string is honored, so `"10x"` counts as 1.
    ///
    /// # Examples
    /// ```
    /// use appicon::IconSpec;
    /// assert_eq!(IconSpec::new("20x20", "iphone", Some("3x")).scale_factor(), 3);
    /// assert_eq!(IconSpec::new("20x20", "iphone", None).scale_factor(), 1);
    /// assert_eq!(IconSpec::new("20x20", "iphone", Some("x")).scale_factor(), 1);
    /// ```
    pub fn scale_factor(&self) -> u32 {
        self.scale
            .as_deref()
            .and_then(|scale| scale.chars().next())
            .and_then(|first| first.to_digit(10))
            .unwrap_or(1)
    }

    /// Returns the pixel dimensions using the explicit `WxH` policy.
    ///
    /// # Examples
    /// ```
    /// use appicon::{IconSpec, PixelSize};
    /// let spec = IconSpec::new("20x21", "iphone", Some("2x"));
    /// assert_eq!(spec.pixel_size(), PixelSize::new(40, 42));
    /// let spec = IconSpec::new("83.5x83.5", "ipad", Some("2x"));
    /// assert_eq!(spec.pixel_size(), PixelSize::new(167, 167));
    /// ```
    pub fn pixel_size(&self) -> PixelSize {
        self.pixel_size_with(SizePolicy::Explicit)
    }

    /// Returns the pixel dimensions under the given size policy.  A size
    /// that cannot be parsed yields a zero size rather than an error.
    pub fn pixel_size_with(&self, policy: SizePolicy) -> PixelSize {
        let nominal = match policy {
            SizePolicy::Explicit => self.explicit_nominal(),
            SizePolicy::Square => self.square_nominal(),
        };
        match nominal {
            Some((width, height)) => {
                let factor = f64::from(self.scale_factor());
                PixelSize::new(to_pixels(width * factor),
                               to_pixels(height * factor))
            }
            None => PixelSize::default(),
        }
    }

    /// Returns the output file stem: the nominal size, suffixed with
    /// `@<scale>` unless the scale factor is 1.
    ///
    /// # Examples
    /// ```
    /// use appicon::IconSpec;
    /// assert_eq!(IconSpec::new("20x20", "iphone", Some("1x")).display_label(), "20x20");
    /// assert_eq!(IconSpec::new("20x21", "iphone", Some("2x")).display_label(), "20x21@2x");
    /// ```
    pub fn display_label(&self) -> String {
        match self.scale.as_deref() {
            Some(scale) if self.scale_factor() != 1 => {
                format!("{}@{}", self.size, scale)
            }
            _ => self.size.clone(),
        }
    }

    /// Name of the PNG file this spec is written to.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.display_label())
    }

    fn explicit_nominal(&self) -> Option<(f64, f64)> {
        let mut tokens = self.size.split('x');
        let width = parse_dimension(tokens.next()?)?;
        let height = match tokens.next() {
            Some(token) => parse_dimension(token)?,
            None => width,
        };
        if tokens.next().is_some() {
            return None;
        }
        Some((width, height))
    }

    fn square_nominal(&self) -> Option<(f64, f64)> {
        let edge = parse_dimension(self.size.split('x').next()?)?;
        Some((edge, edge))
    }
}

impl fmt::Display for IconSpec {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}/{}", self.idiom, self.display_label())
    }
}

/// How the nominal `size` string is turned into two dimensions.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SizePolicy {
    /// Parse `WxH` independently; a single token is used for both.
    #[default]
    Explicit,
    /// Legacy mode: only the first token counts and the icon is square.
    Square,
}

/// Pixel dimensions of a rendered icon.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PixelSize {
    /// Width, in pixels.
    pub width: u32,
    /// Height, in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Creates a pixel size.
    pub fn new(width: u32, height: u32) -> PixelSize {
        PixelSize { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if width and height are equal.
    pub fn is_square(self) -> bool {
        self.width == self.height
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}x{}", self.width, self.height)
    }
}

/// Returns true if `name` names a single entry inside a directory: not
/// empty, not `.` or `..`, and free of path separators.
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." &&
    !name.contains(|c: char| c == '/' || c == '\\' || c == '\0')
}

fn parse_dimension(token: &str) -> Option<f64> {
    let value: f64 = token.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

fn to_pixels(value: f64) -> u32 {
    value.round().min(f64::from(u32::MAX)) as u32
}
