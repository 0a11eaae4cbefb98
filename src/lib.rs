//! Library for exporting app icon sets from a single marketing image.
//!
//! A set of declarative manifests lists every required icon variant (size,
//! idiom, scale).  The [`IconExportEngine`] renders the source image into
//! each variant and writes the PNGs grouped by idiom:
//!
//! ```text
//! Icons/
//!   iphone/20x20@2x.png
//!   ipad/83.5x83.5@2x.png
//!   mac/512x512@2x.png
//! ```
//!
//! ```no_run
//! use appicon::{IconExportEngine, Image, ManifestSource};
//!
//! let image = Image::open("marketing.png")?;
//! let mut engine = IconExportEngine::new(image, "Icons");
//! engine.load(&ManifestSource::defaults())?;
//! let summary = engine.generate_icons()?;
//! println!("wrote {} icons", summary.written.len());
//! # Ok::<(), appicon::Error>(())
//! ```

#![warn(missing_docs)]

mod deliver;
mod engine;
mod error;
mod iconspec;
pub mod manifest;
mod pngio;
mod raster;
pub mod render;

pub use deliver::{CopyDelivery, Delivery};
pub use engine::{group_by_idiom, ExportOptions, ExportState, ExportSummary,
                 IconExportEngine, IdiomGroup};
pub use error::{Error, ErrorExt, Result};
pub use iconspec::{IconSpec, PixelSize, SizePolicy};
pub use manifest::ManifestSource;
pub use raster::{Image, PixelFormat};
