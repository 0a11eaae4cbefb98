//! Declarative lists of required icon variants.
//!
//! A manifest is a JSON document holding an ordered list of records with
//! `size`, `idiom` and optional `scale`, `role` and `subtype` fields.  It may
//! be a bare array or an asset-catalog style object with an `images` array:
//!
//! ```json
//! { "images": [ { "size": "20x20", "idiom": "iphone", "scale": "2x" } ] }
//! ```

use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::iconspec::IconSpec;

/// Manifests compiled into the library, in default load order.
const BUILTIN_MANIFESTS: &[(&str, &str)] = &[
    ("app", include_str!("../manifests/app.json")),
    ("watch", include_str!("../manifests/watch.json")),
    ("mac", include_str!("../manifests/mac.json")),
];

/// Where a manifest comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ManifestSource {
    /// One of the manifests bundled with the library (`app`, `watch`,
    /// `mac`).
    Builtin(String),
    /// A JSON file on disk.
    File(PathBuf),
}

impl ManifestSource {
    /// The built-in manifests: iPhone/iPad, Watch, then Mac.
    pub fn defaults() -> Vec<ManifestSource> {
        BUILTIN_MANIFESTS
            .iter()
            .map(|&(name, _)| ManifestSource::Builtin(name.to_string()))
            .collect()
    }

    /// Locates and decodes this manifest.
    pub fn load(&self) -> Result<Vec<IconSpec>> {
        match self {
            ManifestSource::Builtin(name) => {
                let text = BUILTIN_MANIFESTS
                    .iter()
                    .find(|&&(builtin, _)| builtin == name.as_str())
                    .map(|&(_, text)| text)
                    .ok_or_else(|| {
                        Error::configuration(name.as_str(),
                                             "no built-in manifest by that \
                                              name")
                    })?;
                parse(name, text)
            }
            ManifestSource::File(path) => {
                let name = path.display().to_string();
                let text = fs::read_to_string(path)
                    .map_err(|err| Error::configuration(name.as_str(), err))?;
                parse(&name, &text)
            }
        }
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ManifestSource::Builtin(name) => write!(out, "builtin:{}", name),
            ManifestSource::File(path) => write!(out, "{}", path.display()),
        }
    }
}

/// Decodes a manifest document.  `name` is only used for error messages.
pub fn parse(name: &str, text: &str) -> Result<Vec<IconSpec>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|err| Error::configuration(name, err))?;
    let records = match document {
        Value::Array(_) => document,
        Value::Object(mut object) => match object.remove("images") {
            Some(images @ Value::Array(_)) => images,
            Some(_) => {
                return Err(Error::configuration(name,
                                                "`images` is not a list"));
            }
            None => {
                return Err(Error::configuration(name,
                                                "missing `images` list"));
            }
        },
        _ => {
            return Err(Error::configuration(name,
                                            "expected a list of icon \
                                             records"));
        }
    };
    serde_json::from_value(records).map_err(|err| Error::configuration(name, err))
}

/// Loads every manifest in order and concatenates their specs.  Fails on
/// the first manifest that is missing or malformed.
pub fn load_all(sources: &[ManifestSource]) -> Result<Vec<IconSpec>> {
    let mut specs = Vec::new();
    for source in sources {
        let loaded = source.load()?;
        log::debug!("Loaded {} icon(s) from {}", loaded.len(), source);
        specs.extend(loaded);
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_counts() {
        let count = |name: &str| {
            ManifestSource::Builtin(name.to_string()).load().unwrap().len()
        };
        assert_eq!(count("app"), 18);
        assert_eq!(count("watch"), 11);
        assert_eq!(count("mac"), 10);
        assert_eq!(load_all(&ManifestSource::defaults()).unwrap().len(), 39);
    }

    #[test]
    fn builtin_order_is_preserved() {
        let specs = load_all(&ManifestSource::defaults()).unwrap();
        assert_eq!(specs.first().map(|spec| spec.idiom()), Some("iphone"));
        assert_eq!(specs.last().map(|spec| spec.display_label()),
                   Some("512x512@2x".to_string()));
    }

    #[test]
    fn unknown_builtin_is_configuration_error() {
        let err = ManifestSource::Builtin("tv".to_string()).load()
                                                          .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let source = ManifestSource::File(PathBuf::from("/nonexistent.json"));
        assert!(source.load().unwrap_err().is_configuration());
    }

    #[test]
    fn parse_catalog_object() {
        let specs = parse("catalog",
                          r#"{"images": [
                                 {"size": "16x16", "idiom": "mac", "scale": "1x",
                                  "filename": "icon_16.png"}],
                              "info": {"version": 1, "author": "xcode"}}"#)
            .unwrap();
        assert_eq!(specs, vec![IconSpec::new("16x16", "mac", Some("1x"))]);
    }

    #[test]
    fn parse_empty_list() {
        assert!(parse("empty", "[]").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_bad_documents() {
        for text in &["not json",
                      "42",
                      r#"{"info": {}}"#,
                      r#"{"images": {}}"#,
                      r#"[{"idiom": "mac"}]"#,
                      r#"[{"size": "16x16", "idiom": 3}]"#] {
            let err = parse("bad", text).unwrap_err();
            assert!(err.is_configuration(), "accepted {:?}", text);
        }
    }

    #[test]
    fn one_bad_manifest_aborts_load() {
        let sources = vec![ManifestSource::Builtin("app".to_string()),
                           ManifestSource::Builtin("missing".to_string())];
        assert!(load_all(&sources).unwrap_err().is_configuration());
    }
}
