//! Multi-file model loading: companion discovery and aggregation.
//!
//! A GoldSrc model on disk is one to several files. The primary `.mdl` may
//! externalize its textures into a sibling `<base>t.<ext>` file, and its
//! animation data beyond sequence group 0 into numbered `<base>NN.<ext>`
//! files. Which companions exist is recorded in the primary header: a zero
//! texture count means an external texture file, a sequence group count
//! above one means numbered sequence files. [`load_model`] decodes the
//! primary, resolves companions through a [`FileLoader`] and aggregates
//! everything into a [`LoadedModel`]. Any missing or malformed companion
//! fails the whole load; there are no partial results.

use std::path::Path;

use bon::Builder;
use rootcause::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::fs::{DiskFileLoader, FileLoader};
use crate::mdl::{self, FormatError, MdlFile, SequenceFileHeader, Texture};

/// Errors raised while composing a model from its files.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing external texture file {path}")]
    MissingTextureFile { path: String },
    #[error("missing sequence group file {path}")]
    MissingSequenceFile { path: String },
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// How much of an external texture file to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompanionDecode {
    /// Header, textures and skins only.
    #[default]
    Metadata,
    /// Every section, exactly like the primary file.
    Full,
}

/// Knobs for [`load_model`].
#[derive(Builder, Debug, Clone, Default)]
pub struct LoadOptions {
    /// How much of the external texture file to decode.
    #[builder(default)]
    pub companion_decode: CompanionDecode,
    /// Directory prefix used verbatim (including any trailing separator) in
    /// place of the primary file's own directory when deriving companion
    /// paths. `None` resolves companions next to the primary file.
    pub companion_dir: Option<String>,
}

/// A fully composed model: the primary file plus any companions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadedModel {
    /// Display name, typically the primary file's stem.
    pub name: String,
    pub primary: MdlFile,
    /// The decoded external texture file, when the primary has no textures
    /// of its own.
    pub texture_file: Option<MdlFile>,
    /// Headers of the demand-loaded sequence group files, in group order.
    pub sequence_files: Vec<SequenceFileHeader>,
}

impl LoadedModel {
    /// The texture list in effect: the companion's when one was loaded.
    pub fn textures(&self) -> &[Texture] {
        match &self.texture_file {
            Some(file) => &file.textures,
            None => &self.primary.textures,
        }
    }

    /// The skin table in effect: the companion's when one was loaded.
    pub fn skins(&self) -> &[i16] {
        match &self.texture_file {
            Some(file) => &file.skins,
            None => &self.primary.skins,
        }
    }

    /// Total animation frames across the primary file's sequences.
    pub fn total_frames(&self) -> u64 {
        self.primary
            .sequences
            .iter()
            .map(|sequence| u64::from(sequence.frame_count))
            .sum()
    }
}

/// Load a model from the primary file's bytes, resolving companion files
/// through `fs`.
///
/// `primary_path` is the path the primary bytes were read from, in whatever
/// namespace `fs` resolves; companion paths are derived from it by suffix
/// surgery on the file name. `extension` is appended to companion names
/// verbatim, so it should match what is on disk.
pub fn load_model(
    name: &str,
    primary_data: &[u8],
    primary_path: &str,
    extension: &str,
    fs: &impl FileLoader,
    options: &LoadOptions,
) -> Result<LoadedModel, AssetError> {
    let primary = mdl::parse(primary_data)?;

    let texture_file = if primary.header.texture_count == 0 {
        let path = companion_path(primary_path, "t", extension, options);
        debug!("no internal textures, loading texture file: {path}");
        let data = fs
            .open(&path)
            .ok_or_else(|| AssetError::MissingTextureFile { path: path.clone() })?;
        let file = match options.companion_decode {
            CompanionDecode::Metadata => mdl::parse_texture_file(&data)?,
            CompanionDecode::Full => mdl::parse(&data)?,
        };
        Some(file)
    } else {
        None
    };

    // group 0 is the primary file itself and is never looked up
    let mut sequence_files = Vec::new();
    for i in 1..primary.header.sequence_group_count {
        let path = companion_path(primary_path, &format!("{i:02}"), extension, options);
        debug!("loading sequence group file: {path}");
        let data = fs
            .open(&path)
            .ok_or_else(|| AssetError::MissingSequenceFile { path: path.clone() })?;
        sequence_files.push(mdl::decode_sequence_header(&data)?);
    }

    Ok(LoadedModel {
        name: name.to_owned(),
        primary,
        texture_file,
        sequence_files,
    })
}

/// Load a model from disk, resolving companions next to the primary file.
pub fn load_from_disk(path: &Path, options: &LoadOptions) -> Result<LoadedModel, Report> {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("{} has no usable file name", path.display());
    };
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        bail!("{} has no file extension", path.display());
    };
    let name = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };

    let data =
        std::fs::read(path).context_with(|| format!("failed to read {}", path.display()))?;
    let fs = DiskFileLoader::new(path.parent().unwrap_or(Path::new(".")));

    load_model(name, &data, file_name, extension, &fs, options)
        .map_err(|e| rootcause::report!("failed to load {}: {e}", path.display()))
}

/// Derive a companion path from the primary path: directory kept (or
/// replaced by the configured override), extension stripped at the last dot,
/// `suffix` and the extension appended.
fn companion_path(
    primary_path: &str,
    suffix: &str,
    extension: &str,
    options: &LoadOptions,
) -> String {
    let (dir, file_name) = split_file_name(primary_path);
    let base = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    let dir = options.companion_dir.as_deref().unwrap_or(dir);
    format!("{dir}{base}{suffix}.{extension}")
}

/// Split a path at the last separator, either flavor, keeping the separator
/// on the directory side.
fn split_file_name(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(sep) => path.split_at(sep + 1),
        None => ("", path),
    }
}
