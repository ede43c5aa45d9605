//! Parser for GoldSrc studio model (`.mdl`) files.
//!
//! A studio model is a fixed-layout, offset-indexed container. The 244-byte
//! header carries an element count and an absolute byte offset for each of
//! ten variable-length sections:
//! - bones, bone controllers and hit boxes (skeleton)
//! - sequences and sequence groups (animation bookkeeping)
//! - textures and the skin table
//! - body parts, attachments and transition graph weights
//!
//! [`parse`] decodes the header and all ten sections. Sub-model geometry
//! below body parts (models, meshes, vertices) and texture pixel data stay
//! encoded; their offsets are carried through untouched. Section offsets are
//! only validated when a section is actually decoded, so files with bogus
//! offsets on empty sections still parse.

pub mod header;
pub mod records;
#[cfg(test)]
pub mod testdata;

use std::fmt;

use thiserror::Error;
use tracing::warn;
use winnow::Parser;
use winnow::binary::{le_i16, le_u8};

use crate::parser_utils::WResult;

pub use header::{
    FileKind, ModelHeader, SequenceFileHeader, decode_model_header, decode_sequence_header,
};
pub use records::{
    Attachment, BodyPart, Bone, BoneController, HitBox, Sequence, SequenceGroup, Texture,
};

/// The ten variable-length sections of a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Bones,
    BoneControllers,
    HitBoxes,
    Sequences,
    SequenceGroups,
    Textures,
    Skins,
    BodyParts,
    Attachments,
    Transitions,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Bones => "bones",
            Section::BoneControllers => "bone controllers",
            Section::HitBoxes => "hit boxes",
            Section::Sequences => "sequences",
            Section::SequenceGroups => "sequence groups",
            Section::Textures => "textures",
            Section::Skins => "skins",
            Section::BodyParts => "body parts",
            Section::Attachments => "attachments",
            Section::Transitions => "transitions",
        };
        f.write_str(name)
    }
}

/// Errors raised while decoding a single file's bytes.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unrecognized ident 0x{0:08X}")]
    UnrecognizedIdent(u32),
    #[error("expected a {expected} file, found a {found} file")]
    WrongFileKind { expected: FileKind, found: FileKind },
    #[error("unsupported studio model version {0}")]
    UnsupportedVersion(i32),
    #[error("file truncated inside the {0} header")]
    TruncatedHeader(FileKind),
    #[error("{section} section out of bounds (offset {offset}, file is {len} bytes)")]
    SectionOutOfBounds {
        section: Section,
        offset: i32,
        len: usize,
    },
    #[error("{section} section truncated at record {record}")]
    TruncatedSection { section: Section, record: usize },
}

/// A fully decoded model file: the header plus the ten record sections.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MdlFile {
    pub header: ModelHeader,
    pub bones: Vec<Bone>,
    pub bone_controllers: Vec<BoneController>,
    pub hitboxes: Vec<HitBox>,
    pub sequences: Vec<Sequence>,
    pub sequence_groups: Vec<SequenceGroup>,
    pub textures: Vec<Texture>,
    /// Texture indices of the first skin family.
    pub skins: Vec<i16>,
    pub body_parts: Vec<BodyPart>,
    pub attachments: Vec<Attachment>,
    /// Transition graph edge weights.
    pub transitions: Vec<u8>,
}

/// Decode a complete model file from raw bytes.
///
/// Sections are decoded in a fixed order (bones, bone controllers, hit
/// boxes, sequences, sequence groups, textures, skins, body parts,
/// attachments, transitions); each seeks independently from the start of
/// the buffer, so their on-disk layout order does not matter.
pub fn parse(file_data: &[u8]) -> Result<MdlFile, FormatError> {
    let header = header::decode_model_header(file_data)?;
    warn_on_length_mismatch(&header, file_data);

    let bones = decode_section(
        file_data,
        header.bone_count,
        header.bone_offset,
        Section::Bones,
        records::parse_bone,
    )?;
    let bone_controllers = decode_section(
        file_data,
        header.bone_controller_count,
        header.bone_controller_offset,
        Section::BoneControllers,
        records::parse_bone_controller,
    )?;
    let hitboxes = decode_section(
        file_data,
        header.hitbox_count,
        header.hitbox_offset,
        Section::HitBoxes,
        records::parse_hitbox,
    )?;
    let sequences = decode_section(
        file_data,
        header.sequence_count,
        header.sequence_offset,
        Section::Sequences,
        records::parse_sequence,
    )?;
    let sequence_groups = decode_section(
        file_data,
        header.sequence_group_count,
        header.sequence_group_offset,
        Section::SequenceGroups,
        records::parse_sequence_group,
    )?;
    let textures = decode_section(
        file_data,
        header.texture_count,
        header.texture_offset,
        Section::Textures,
        records::parse_texture,
    )?;
    let skins = decode_skins(file_data, &header)?;
    let body_parts = decode_section(
        file_data,
        header.body_part_count,
        header.body_part_offset,
        Section::BodyParts,
        records::parse_body_part,
    )?;
    let attachments = decode_section(
        file_data,
        header.attachment_count,
        header.attachment_offset,
        Section::Attachments,
        records::parse_attachment,
    )?;
    let transitions = decode_section(
        file_data,
        header.transition_count,
        header.transition_offset,
        Section::Transitions,
        |input: &mut &[u8]| le_u8.parse_next(input),
    )?;

    Ok(MdlFile {
        header,
        bones,
        bone_controllers,
        hitboxes,
        sequences,
        sequence_groups,
        textures,
        skins,
        body_parts,
        attachments,
        transitions,
    })
}

/// Decode an external texture file: header, textures and skins only.
///
/// Texture companions are structurally ordinary model files, but everything
/// except their texture metadata and skin table is empty, so the other
/// sections are not decoded.
pub fn parse_texture_file(file_data: &[u8]) -> Result<MdlFile, FormatError> {
    let header = header::decode_model_header(file_data)?;
    warn_on_length_mismatch(&header, file_data);

    let textures = decode_section(
        file_data,
        header.texture_count,
        header.texture_offset,
        Section::Textures,
        records::parse_texture,
    )?;
    let skins = decode_skins(file_data, &header)?;

    Ok(MdlFile {
        header,
        bones: Vec::new(),
        bone_controllers: Vec::new(),
        hitboxes: Vec::new(),
        sequences: Vec::new(),
        sequence_groups: Vec::new(),
        textures,
        skins,
        body_parts: Vec::new(),
        attachments: Vec::new(),
        transitions: Vec::new(),
    })
}

fn warn_on_length_mismatch(header: &ModelHeader, file_data: &[u8]) {
    if header.length as usize != file_data.len() {
        warn!(
            "recorded length {} does not match the {} bytes given",
            header.length,
            file_data.len()
        );
    }
}

fn decode_skins(file_data: &[u8], header: &ModelHeader) -> Result<Vec<i16>, FormatError> {
    // Families beyond the first share the same offset table; only the first
    // family is decoded.
    decode_section(
        file_data,
        header.skin_ref_count,
        header.skin_offset,
        Section::Skins,
        |input: &mut &[u8]| le_i16.parse_next(input),
    )
}

/// Decode `count` records laid out back to back at `offset`.
///
/// A zero count produces an empty list without looking at the offset, so
/// headers with garbage offsets on empty sections decode fine. A non-zero
/// count with an offset outside the buffer fails with
/// [`FormatError::SectionOutOfBounds`]; exhausting the buffer mid-record
/// fails with [`FormatError::TruncatedSection`].
fn decode_section<T>(
    file_data: &[u8],
    count: u32,
    offset: i32,
    section: Section,
    mut parse_record: impl FnMut(&mut &[u8]) -> WResult<T>,
) -> Result<Vec<T>, FormatError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if offset < 0 || offset as usize > file_data.len() {
        return Err(FormatError::SectionOutOfBounds {
            section,
            offset,
            len: file_data.len(),
        });
    }

    let available = file_data.len() - offset as usize;
    let input = &mut &file_data[offset as usize..];
    // a record occupies at least one byte
    let mut records = Vec::with_capacity((count as usize).min(available));
    for record in 0..count as usize {
        let item =
            parse_record(input).map_err(|_| FormatError::TruncatedSection { section, record })?;
        records.push(item);
    }
    Ok(records)
}
