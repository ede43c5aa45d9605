//! Fixed-layout header decoding and ident/version validation.
//!
//! Both studio file kinds start with the same prefix (ident, version, name,
//! length); only the ident distinguishes a main model from a demand-loaded
//! sequence group file. Callers state their expectation by picking
//! [`decode_model_header`] or [`decode_sequence_header`], and a mismatched
//! ident is an error rather than a silent reinterpretation.

use std::fmt;

use winnow::Parser;
use winnow::binary::{le_i32, le_u32};
use winnow::error::{ContextError, ErrMode};

use crate::mdl::FormatError;
use crate::parser_utils::{WResult, parse_fixed_string, parse_vec3};

/// "IDST" as a little-endian u32: the ident of a main model file.
pub const IDENT_MDL: u32 = u32::from_le_bytes(*b"IDST");
/// "IDSQ" as a little-endian u32: the ident of a sequence group file.
pub const IDENT_SEQ: u32 = u32::from_le_bytes(*b"IDSQ");
/// The only studio model version this crate understands.
pub const VERSION: i32 = 10;

/// Width of the name field in both header layouts.
pub const HEADER_NAME_SIZE: usize = 64;
/// Size of the fixed header region of a main model file.
pub const MODEL_HEADER_SIZE: usize = 244;
/// Size of a sequence group file's header.
pub const SEQUENCE_HEADER_SIZE: usize = 76;

/// Which of the two studio file layouts a header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileKind {
    Model,
    SequenceGroup,
}

impl FileKind {
    fn from_ident(ident: u32) -> Option<FileKind> {
        match ident {
            IDENT_MDL => Some(FileKind::Model),
            IDENT_SEQ => Some(FileKind::SequenceGroup),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Model => f.write_str("model"),
            FileKind::SequenceGroup => f.write_str("sequence group"),
        }
    }
}

/// The 244-byte fixed header of a main model file.
///
/// The section table is thirteen (count, offset) pairs; counts are element
/// counts, offsets are absolute byte positions from the start of the file.
/// Offsets are not range-checked here. Validation happens when the section
/// is decoded, so a header with a bogus offset for a zero-count section
/// still decodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelHeader {
    pub ident: u32,
    pub version: i32,
    /// Model path as recorded by the compiler.
    pub name: String,
    /// Total file length in bytes as recorded by the compiler.
    pub length: i32,
    pub eye_position: [f32; 3],
    /// Ideal movement hull.
    pub hull_min: [f32; 3],
    pub hull_max: [f32; 3],
    /// Clipping bounding box.
    pub clip_min: [f32; 3],
    pub clip_max: [f32; 3],
    pub flags: i32,
    pub bone_count: u32,
    pub bone_offset: i32,
    pub bone_controller_count: u32,
    pub bone_controller_offset: i32,
    pub hitbox_count: u32,
    pub hitbox_offset: i32,
    pub sequence_count: u32,
    pub sequence_offset: i32,
    /// Sequence group 0 lives in this file; groups 1.. are sibling `NN.mdl`
    /// files loaded on demand.
    pub sequence_group_count: u32,
    pub sequence_group_offset: i32,
    /// Zero when textures are externalized into a sibling `t.mdl` file.
    pub texture_count: u32,
    pub texture_offset: i32,
    /// Offset of the raw pixel data. Pixels are not decoded by this crate.
    pub texture_data_offset: i32,
    /// Texture slots per skin family.
    pub skin_ref_count: u32,
    /// Alternate skin families.
    pub skin_family_count: u32,
    pub skin_offset: i32,
    pub body_part_count: u32,
    pub body_part_offset: i32,
    pub attachment_count: u32,
    pub attachment_offset: i32,
    /// Obsolete sound fields. Never populated by the shipped tools but they
    /// still occupy header bytes.
    pub sound_table: u32,
    pub sound_offset: i32,
    pub sound_group_count: u32,
    pub sound_group_offset: i32,
    /// Transition graph edge weights.
    pub transition_count: u32,
    pub transition_offset: i32,
}

/// The abbreviated 76-byte header of a sequence group file.
///
/// Sequence group files carry only animation frame data; there is no section
/// table to decode, so the header is all that is read from them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceFileHeader {
    pub ident: u32,
    pub version: i32,
    pub name: String,
    pub length: i32,
}

/// Decode and validate the header of a main model file.
///
/// Fails with [`FormatError::WrongFileKind`] on a sequence group ident,
/// [`FormatError::UnrecognizedIdent`] on anything else,
/// [`FormatError::UnsupportedVersion`] on any version other than 10, and
/// [`FormatError::TruncatedHeader`] if fewer than 244 bytes are available.
pub fn decode_model_header(file_data: &[u8]) -> Result<ModelHeader, FormatError> {
    let input = &mut &file_data[..];
    let (ident, version) = decode_ident_version(input, FileKind::Model)?;
    parse_model_header_body(input, ident, version)
        .map_err(|_| FormatError::TruncatedHeader(FileKind::Model))
}

/// Decode and validate the header of a sequence group file, expecting the
/// `IDSQ` ident. The counterpart of [`decode_model_header`].
pub fn decode_sequence_header(file_data: &[u8]) -> Result<SequenceFileHeader, FormatError> {
    let input = &mut &file_data[..];
    let (ident, version) = decode_ident_version(input, FileKind::SequenceGroup)?;
    parse_sequence_header_body(input, ident, version)
        .map_err(|_| FormatError::TruncatedHeader(FileKind::SequenceGroup))
}

fn decode_ident_version(input: &mut &[u8], expected: FileKind) -> Result<(u32, i32), FormatError> {
    let ident = le_u32
        .parse_next(input)
        .map_err(|_: ErrMode<ContextError>| FormatError::TruncatedHeader(expected))?;
    let version = le_i32
        .parse_next(input)
        .map_err(|_: ErrMode<ContextError>| FormatError::TruncatedHeader(expected))?;

    let found = FileKind::from_ident(ident).ok_or(FormatError::UnrecognizedIdent(ident))?;
    if found != expected {
        return Err(FormatError::WrongFileKind { expected, found });
    }
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok((ident, version))
}

fn parse_model_header_body(input: &mut &[u8], ident: u32, version: i32) -> WResult<ModelHeader> {
    let name = parse_fixed_string(input, HEADER_NAME_SIZE)?;
    let length = le_i32.parse_next(input)?;
    let eye_position = parse_vec3(input)?;
    let hull_min = parse_vec3(input)?;
    let hull_max = parse_vec3(input)?;
    let clip_min = parse_vec3(input)?;
    let clip_max = parse_vec3(input)?;
    let flags = le_i32.parse_next(input)?;
    let bone_count = le_u32.parse_next(input)?;
    let bone_offset = le_i32.parse_next(input)?;
    let bone_controller_count = le_u32.parse_next(input)?;
    let bone_controller_offset = le_i32.parse_next(input)?;
    let hitbox_count = le_u32.parse_next(input)?;
    let hitbox_offset = le_i32.parse_next(input)?;
    let sequence_count = le_u32.parse_next(input)?;
    let sequence_offset = le_i32.parse_next(input)?;
    let sequence_group_count = le_u32.parse_next(input)?;
    let sequence_group_offset = le_i32.parse_next(input)?;
    let texture_count = le_u32.parse_next(input)?;
    let texture_offset = le_i32.parse_next(input)?;
    let texture_data_offset = le_i32.parse_next(input)?;
    let skin_ref_count = le_u32.parse_next(input)?;
    let skin_family_count = le_u32.parse_next(input)?;
    let skin_offset = le_i32.parse_next(input)?;
    let body_part_count = le_u32.parse_next(input)?;
    let body_part_offset = le_i32.parse_next(input)?;
    let attachment_count = le_u32.parse_next(input)?;
    let attachment_offset = le_i32.parse_next(input)?;
    let sound_table = le_u32.parse_next(input)?;
    let sound_offset = le_i32.parse_next(input)?;
    let sound_group_count = le_u32.parse_next(input)?;
    let sound_group_offset = le_i32.parse_next(input)?;
    let transition_count = le_u32.parse_next(input)?;
    let transition_offset = le_i32.parse_next(input)?;
    Ok(ModelHeader {
        ident,
        version,
        name,
        length,
        eye_position,
        hull_min,
        hull_max,
        clip_min,
        clip_max,
        flags,
        bone_count,
        bone_offset,
        bone_controller_count,
        bone_controller_offset,
        hitbox_count,
        hitbox_offset,
        sequence_count,
        sequence_offset,
        sequence_group_count,
        sequence_group_offset,
        texture_count,
        texture_offset,
        texture_data_offset,
        skin_ref_count,
        skin_family_count,
        skin_offset,
        body_part_count,
        body_part_offset,
        attachment_count,
        attachment_offset,
        sound_table,
        sound_offset,
        sound_group_count,
        sound_group_offset,
        transition_count,
        transition_offset,
    })
}

fn parse_sequence_header_body(
    input: &mut &[u8],
    ident: u32,
    version: i32,
) -> WResult<SequenceFileHeader> {
    let name = parse_fixed_string(input, HEADER_NAME_SIZE)?;
    let length = le_i32.parse_next(input)?;
    Ok(SequenceFileHeader {
        ident,
        version,
        name,
        length,
    })
}
