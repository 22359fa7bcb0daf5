// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Output path derivation and artifact persistence.
//!
//! Destinations are either explicit overrides or derived as
//! `<outputDir>/<identity>-<suffix>.svg`. The two resolved paths must
//! differ; a collision is a fatal configuration error raised before any
//! filesystem work happens. Writes go through a buffered writer and
//! replace existing files unconditionally.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use crate::{
    error::{self, Error},
    options::CardKind
};

/// File extension applied to generated artifacts.
const ARTIFACT_EXTENSION: &str = "svg";

/// The two resolved card destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Destination of the stats card.
    pub stats:         PathBuf,
    /// Destination of the top languages card.
    pub top_languages: PathBuf
}

/// Resolves both destination paths, honoring explicit overrides.
///
/// # Errors
///
/// Returns [`Error::PathCollision`](Error::PathCollision) when both cards
/// resolve to the same path, regardless of whether the paths came from
/// overrides or defaults.
pub fn resolve_output_paths(
    output_dir: &Path,
    identity: &str,
    stats_override: Option<&Path>,
    top_langs_override: Option<&Path>
) -> Result<OutputPaths, Error> {
    let stats = resolve_single(output_dir, identity, CardKind::Stats, stats_override);
    let top_languages =
        resolve_single(output_dir, identity, CardKind::TopLanguages, top_langs_override);

    if stats == top_languages {
        return Err(Error::PathCollision {
            path: stats
        });
    }

    Ok(OutputPaths {
        stats,
        top_languages
    })
}

fn resolve_single(
    output_dir: &Path,
    identity: &str,
    kind: CardKind,
    explicit: Option<&Path>
) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(format!("{identity}-{}.{ARTIFACT_EXTENSION}", kind.file_suffix()))
    }
}

/// Creates the parent directory of each destination, tolerating
/// pre-existing directories.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when a directory cannot be created.
pub fn ensure_parent_dirs(paths: &OutputPaths) -> Result<(), Error> {
    for destination in [&paths.stats, &paths.top_languages] {
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| error::io_error(parent, source))?;
        }
    }
    Ok(())
}

/// Writes a rendered document body to its destination byte-for-byte,
/// replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the file cannot be created or
/// written.
pub fn persist_document(path: &Path, body: &str) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(body.as_bytes())
        .map_err(|source| error::io_error(path, source))?;
    writer.flush().map_err(|source| error::io_error(path, source))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{ensure_parent_dirs, persist_document, resolve_output_paths};
    use crate::error::Error;

    #[test]
    fn derives_both_paths_from_identity_and_output_dir() {
        let paths = resolve_output_paths(Path::new("out"), "octocat", None, None)
            .expect("expected resolution success");

        assert_eq!(paths.stats, PathBuf::from("out/octocat-stats.svg"));
        assert_eq!(paths.top_languages, PathBuf::from("out/octocat-top-langs.svg"));
    }

    #[test]
    fn explicit_overrides_are_honored() {
        let paths = resolve_output_paths(
            Path::new("out"),
            "octocat",
            Some(Path::new("custom/stats.svg")),
            None
        )
        .expect("expected resolution success");

        assert_eq!(paths.stats, PathBuf::from("custom/stats.svg"));
        assert_eq!(paths.top_languages, PathBuf::from("out/octocat-top-langs.svg"));
    }

    #[test]
    fn identical_overrides_collide() {
        let error = resolve_output_paths(
            Path::new("out"),
            "octocat",
            Some(Path::new("x.svg")),
            Some(Path::new("x.svg"))
        )
        .expect_err("expected collision");

        match error {
            Error::PathCollision {
                path
            } => assert_eq!(path, PathBuf::from("x.svg")),
            other => panic!("expected path collision, got {other:?}")
        }
    }

    #[test]
    fn override_colliding_with_derived_path_is_rejected() {
        let error = resolve_output_paths(
            Path::new("out"),
            "octocat",
            Some(Path::new("out/octocat-top-langs.svg")),
            None
        )
        .expect_err("expected collision");
        assert!(matches!(error, Error::PathCollision { .. }));
    }

    #[test]
    fn ensure_parent_dirs_creates_missing_directories() {
        let temp = tempdir().expect("failed to create tempdir");
        let paths = resolve_output_paths(&temp.path().join("nested/cards"), "octocat", None, None)
            .expect("expected resolution success");

        ensure_parent_dirs(&paths).expect("expected directory creation");
        assert!(temp.path().join("nested/cards").is_dir());

        // A second pass over existing directories must be a no-op.
        ensure_parent_dirs(&paths).expect("expected idempotent directory creation");
    }

    #[test]
    fn persist_document_overwrites_existing_files() {
        let temp = tempdir().expect("failed to create tempdir");
        let destination = temp.path().join("card.svg");

        persist_document(&destination, "<svg>first</svg>").expect("expected first write");
        persist_document(&destination, "<svg>second</svg>").expect("expected overwrite");

        let contents = std::fs::read_to_string(&destination).expect("expected readable file");
        assert_eq!(contents, "<svg>second</svg>");
    }

    #[test]
    fn persist_document_reports_unwritable_destinations() {
        let error = persist_document(Path::new("/nonexistent/dir/card.svg"), "<svg/>")
            .expect_err("expected io error");
        assert!(matches!(error, Error::Io { .. }));
    }
}
