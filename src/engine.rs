//! The batch export run: manifests in, one directory of PNGs per idiom out.

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorExt, Result};
use crate::iconspec::{self, IconSpec, SizePolicy};
use crate::manifest::{self, ManifestSource};
use crate::raster::Image;
use crate::render;

/// Knobs for one export run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportOptions {
    /// How nominal sizes are turned into pixel dimensions.
    pub size_policy: SizePolicy,
    /// Render the icons of each idiom on the rayon thread pool.
    pub parallel: bool,
}

/// Where an engine is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportState {
    /// Created, no manifests loaded yet.
    Idle,
    /// Specs are loaded.
    Loaded,
    /// Specs are grouped and their file names checked.
    Grouped,
    /// Files are being written.
    Writing,
    /// The last run completed.
    Done,
    /// The last run failed; some files may already exist on disk.
    Failed,
}

/// All specs sharing one idiom, in manifest order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdiomGroup {
    /// The idiom, also the name of the output subdirectory.
    pub idiom: String,
    /// Specs of this idiom, in manifest order.
    pub specs: Vec<IconSpec>,
}

/// What an export run produced.
#[derive(Clone, Debug, Default)]
pub struct ExportSummary {
    /// Every file written, in write order.
    pub written: Vec<PathBuf>,
    /// Specs whose pixel size had zero area or exceeded
    /// [`render::MAX_EDGE`].
    pub skipped: Vec<IconSpec>,
}

/// Exports a full icon set from one source image.
pub struct IconExportEngine {
    specs: Vec<IconSpec>,
    image: Image,
    output_root: PathBuf,
    options: ExportOptions,
    state: ExportState,
}

enum Outcome {
    Written(PathBuf),
    Skipped(IconSpec),
}

impl IconExportEngine {
    /// Creates an engine with no specs loaded.
    pub fn new(image: Image, output_root: impl Into<PathBuf>)
               -> IconExportEngine {
        IconExportEngine {
            specs: Vec::new(),
            image: image,
            output_root: output_root.into(),
            options: ExportOptions::default(),
            state: ExportState::Idle,
        }
    }

    /// Creates an engine with an already loaded list of specs.
    pub fn with_specs(image: Image,
                      output_root: impl Into<PathBuf>,
                      specs: Vec<IconSpec>)
                      -> IconExportEngine {
        let mut engine = IconExportEngine::new(image, output_root);
        engine.specs = specs;
        engine.state = ExportState::Loaded;
        engine
    }

    /// Replaces the export options.
    pub fn with_options(mut self, options: ExportOptions) -> IconExportEngine {
        self.options = options;
        self
    }

    /// Loads and concatenates the given manifests, replacing any specs
    /// loaded before.  Nothing is replaced if any manifest fails.
    pub fn load(&mut self, sources: &[ManifestSource]) -> Result<&[IconSpec]> {
        self.specs = manifest::load_all(sources)?;
        self.state = ExportState::Loaded;
        log::info!("Loaded {} icon spec(s) from {} manifest(s)",
                   self.specs.len(),
                   sources.len());
        Ok(&self.specs)
    }

    /// The loaded specs, in manifest order.
    pub fn specs(&self) -> &[IconSpec] {
        &self.specs
    }

    /// The directory every run recreates.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The options used by `generate_icons`.
    pub fn options(&self) -> ExportOptions {
        self.options
    }

    /// Where the engine is in its lifecycle.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Partitions the loaded specs by idiom.  Groups appear in order of
    /// first occurrence and keep the relative order of their specs.
    pub fn group_by_idiom(&self) -> Vec<IdiomGroup> {
        group_by_idiom(&self.specs)
    }

    /// Runs the export: recreates the output root, then writes every spec
    /// into `<output_root>/<idiom>/<label>.png`.  Specs with zero pixel area
    /// or an edge over [`render::MAX_EDGE`] are skipped.  Every idiom and
    /// label must be a plain file name and labels must be unique per idiom;
    /// both are checked before the output root is touched.  Stops at the
    /// first I/O failure without removing what was already written.
    pub fn generate_icons(&mut self) -> Result<ExportSummary> {
        let result = self.run();
        self.state = if result.is_ok() {
            ExportState::Done
        } else {
            ExportState::Failed
        };
        result
    }

    fn run(&mut self) -> Result<ExportSummary> {
        let groups = self.group_by_idiom();
        check_layout(&groups)?;
        self.state = ExportState::Grouped;

        log::info!("Exporting {} icon(s) in {} idiom(s) to {}",
                   self.specs.len(),
                   groups.len(),
                   self.output_root.display());
        remove_dir_if_exists(&self.output_root)?;
        fs::create_dir_all(&self.output_root)
            .fs_context("creating output root", &self.output_root)?;
        self.state = ExportState::Writing;

        let summary = self.write_groups(&groups)?;
        log::info!("Wrote {} icon(s), skipped {}",
                   summary.written.len(),
                   summary.skipped.len());
        Ok(summary)
    }

    /// Writes each group into its idiom directory under the output root,
    /// one group at a time.
    fn write_groups(&self, groups: &[IdiomGroup]) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        for group in groups {
            let dir = self.output_root.join(&group.idiom);
            fs::create_dir_all(&dir)
                .fs_context("creating idiom directory", &dir)?;
            log::debug!("Writing {} icon(s) to {}",
                        group.specs.len(),
                        dir.display());

            let outcomes = if self.options.parallel {
                group.specs
                     .par_iter()
                     .map(|spec| self.write_icon(spec, &dir))
                     .collect::<Result<Vec<_>>>()?
            } else {
                group.specs
                     .iter()
                     .map(|spec| self.write_icon(spec, &dir))
                     .collect::<Result<Vec<_>>>()?
            };
            for outcome in outcomes {
                match outcome {
                    Outcome::Written(path) => summary.written.push(path),
                    Outcome::Skipped(spec) => summary.skipped.push(spec),
                }
            }
        }
        Ok(summary)
    }

    fn write_icon(&self, spec: &IconSpec, dir: &Path) -> Result<Outcome> {
        let size = spec.pixel_size_with(self.options.size_policy);
        let bytes = match render::render_png(&self.image, size)? {
            Some(bytes) => bytes,
            None => {
                log::warn!("Skipping {}: size {:?} gives {} pixels, \
                            which cannot be rendered",
                           spec,
                           spec.size(),
                           size);
                return Ok(Outcome::Skipped(spec.clone()));
            }
        };
        let path = dir.join(spec.file_name());
        fs::write(&path, bytes).fs_context("writing icon", &path)?;
        log::debug!("Wrote {} ({})", path.display(), size);
        Ok(Outcome::Written(path))
    }
}

/// Partitions specs by idiom, keeping first-occurrence order of idioms and
/// source order within each group.
pub fn group_by_idiom(specs: &[IconSpec]) -> Vec<IdiomGroup> {
    let mut groups: Vec<IdiomGroup> = Vec::new();
    for spec in specs {
        match groups.iter_mut().find(|group| group.idiom == spec.idiom()) {
            Some(group) => group.specs.push(spec.clone()),
            None => {
                groups.push(IdiomGroup {
                    idiom: spec.idiom().to_string(),
                    specs: vec![spec.clone()],
                })
            }
        }
    }
    groups
}

/// Fails on the first idiom or label that is not a plain file name, or on
/// the first pair of specs in one idiom that share a label.
fn check_layout(groups: &[IdiomGroup]) -> Result<()> {
    for group in groups {
        if !iconspec::is_plain_name(&group.idiom) {
            return Err(Error::UnsafeName {
                idiom: group.idiom.clone(),
                name: group.idiom.clone(),
            });
        }
        let mut seen = HashSet::new();
        for spec in &group.specs {
            let label = spec.display_label();
            if !iconspec::is_plain_name(&label) {
                return Err(Error::UnsafeName {
                    idiom: group.idiom.clone(),
                    name: label,
                });
            }
            if !seen.insert(label.clone()) {
                return Err(Error::DuplicateLabel {
                    idiom: group.idiom.clone(),
                    label: label,
                });
            }
        }
    }
    Ok(())
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).fs_context("removing output root", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(size: &str, idiom: &str, scale: &str) -> IconSpec {
        IconSpec::new(size, idiom, Some(scale))
    }

    #[test]
    fn groups_follow_first_occurrence() {
        let specs = vec![spec("20x20", "iphone", "2x"),
                         spec("16x16", "mac", "1x"),
                         spec("20x20", "iphone", "3x"),
                         spec("20x20", "ipad", "1x"),
                         spec("16x16", "mac", "2x")];
        let groups = group_by_idiom(&specs);
        let idioms: Vec<&str> =
            groups.iter().map(|group| group.idiom.as_str()).collect();
        assert_eq!(idioms, vec!["iphone", "mac", "ipad"]);
        assert_eq!(groups[0].specs,
                   vec![spec("20x20", "iphone", "2x"),
                        spec("20x20", "iphone", "3x")]);
        assert_eq!(groups[1].specs,
                   vec![spec("16x16", "mac", "1x"), spec("16x16", "mac", "2x")]);
    }

    #[test]
    fn grouping_loses_nothing() {
        let specs = manifest::load_all(&ManifestSource::defaults()).unwrap();
        let groups = group_by_idiom(&specs);
        assert_eq!(groups.len(), 6);
        let total: usize = groups.iter().map(|group| group.specs.len()).sum();
        assert_eq!(total, specs.len());
        for spec in &specs {
            let holders = groups.iter()
                                .filter(|group| group.specs.contains(spec))
                                .count();
            assert_eq!(holders, 1);
        }
    }

    #[test]
    fn empty_specs_give_no_groups() {
        assert!(group_by_idiom(&[]).is_empty());
    }

    #[test]
    fn builtin_manifests_have_unique_labels() {
        let specs = manifest::load_all(&ManifestSource::defaults()).unwrap();
        assert!(check_layout(&group_by_idiom(&specs)).is_ok());
        for spec in &specs {
            assert!(!spec.pixel_size().is_empty(), "{} has no pixels", spec);
        }
    }

    #[test]
    fn same_label_in_different_idioms_is_fine() {
        let specs = vec![spec("1024x1024", "ios-marketing", "1x"),
                         spec("1024x1024", "watch-marketing", "1x")];
        assert!(check_layout(&group_by_idiom(&specs)).is_ok());
    }

    #[test]
    fn duplicate_label_is_reported() {
        let specs = vec![spec("29x29", "watch", "2x"),
                         spec("40x40", "watch", "2x"),
                         spec("29x29", "watch", "2x")];
        match check_layout(&group_by_idiom(&specs)) {
            Err(Error::DuplicateLabel { idiom, label }) => {
                assert_eq!(idiom, "watch");
                assert_eq!(label, "29x29@2x");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unsafe_names_are_reported() {
        let specs = vec![spec("16x16", "mac", "1x"), spec("../up", "mac", "1x")];
        match check_layout(&group_by_idiom(&specs)) {
            Err(Error::UnsafeName { idiom, name }) => {
                assert_eq!(idiom, "mac");
                assert_eq!(name, "../up");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let specs = vec![spec("16x16", "/tmp/mac", "1x")];
        match check_layout(&group_by_idiom(&specs)) {
            Err(Error::UnsafeName { name, .. }) => assert_eq!(name, "/tmp/mac"),
            other => panic!("unexpected result: {:?}", other),
        }
        let specs = vec![spec("16x16", "mac", "2/x")];
        assert!(check_layout(&group_by_idiom(&specs)).is_err());
    }

    #[test]
    fn failed_write_keeps_earlier_icons_and_stops() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("Icons");
        let specs = vec![spec("20x20", "iphone", "1x"),
                         spec("16x16", "mac", "1x"),
                         spec("16x16", "mac", "2x"),
                         spec("32x32", "mac", "1x")];
        let image = Image::new(crate::raster::PixelFormat::RGBA, 4, 4);
        let engine = IconExportEngine::with_specs(image, &root, specs);
        // A directory where the third icon should go makes its write fail.
        fs::create_dir_all(root.join("mac").join("16x16@2x.png")).unwrap();

        let err = engine.write_groups(&engine.group_by_idiom()).unwrap_err();
        assert!(err.is_io(), "unexpected error: {:?}", err);
        assert!(root.join("iphone").join("20x20.png").is_file());
        assert!(root.join("mac").join("16x16.png").is_file());
        assert!(!root.join("mac").join("32x32.png").exists());
    }

    #[test]
    fn lifecycle_states() {
        let image = Image::new(crate::raster::PixelFormat::RGBA, 4, 4);
        let mut engine = IconExportEngine::new(image, "/nonexistent/Icons");
        assert_eq!(engine.state(), ExportState::Idle);
        assert!(engine.load(&[ManifestSource::Builtin("nope".to_string())])
                      .is_err());
        assert_eq!(engine.state(), ExportState::Idle);
        engine.load(&[ManifestSource::Builtin("mac".to_string())]).unwrap();
        assert_eq!(engine.state(), ExportState::Loaded);
        assert_eq!(engine.specs().len(), 10);
        assert_eq!(engine.group_by_idiom().len(), 1);
    }
}
