//! Record types for the ten variable-length sections, plus their winnow parsers.
//!
//! Every record is a fixed number of bytes on the wire; a section is `count`
//! records laid out back to back at the header's section offset. Field order
//! in each struct mirrors the wire order exactly.

use winnow::Parser;
use winnow::binary::{le_f32, le_i32, le_u32};

use crate::parser_utils::{WResult, parse_fixed_string, parse_vec3};

/// Width of a bone name field.
pub const BONE_NAME_SIZE: usize = 32;
/// Degrees of freedom per bone (x, y, z, rx, ry, rz).
pub const CONTROLLERS_PER_BONE: usize = 6;
/// Width of a sequence label field.
pub const SEQUENCE_LABEL_SIZE: usize = 32;
/// Blend slots per sequence.
pub const SEQUENCE_BLEND_COUNT: usize = 2;
/// Width of a sequence group label field.
pub const SEQUENCE_GROUP_LABEL_SIZE: usize = 32;
/// Width of a sequence group file name field.
pub const SEQUENCE_GROUP_NAME_SIZE: usize = 64;
/// Width of a texture name field.
pub const TEXTURE_NAME_SIZE: usize = 64;
/// Width of a body part name field.
pub const BODY_PART_NAME_SIZE: usize = 64;
/// Width of an attachment name field.
pub const ATTACHMENT_NAME_SIZE: usize = 32;
/// Orientation vectors per attachment.
pub const ATTACHMENT_VECTOR_COUNT: usize = 3;

/// A node in the skeletal hierarchy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub name: String,
    /// Parent bone index, -1 for the root.
    pub parent: i32,
    pub flags: i32,
    /// Bone controller index per degree of freedom, -1 when unbound.
    pub controller: [i32; CONTROLLERS_PER_BONE],
    /// Default value per degree of freedom.
    pub default_value: [f32; CONTROLLERS_PER_BONE],
    /// Compression scale per degree of freedom.
    pub scale: [f32; CONTROLLERS_PER_BONE],
}

/// Maps a user-adjustable controller channel onto a bone's degree of freedom.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneController {
    pub bone: i32,
    /// Motion type of the controlled degree of freedom.
    pub kind: i32,
    pub start: f32,
    pub end: f32,
    pub rest: i32,
    /// Controller slot: 0-3 are user channels, 4 is the mouth.
    pub index: i32,
}

/// An axis-aligned hit box attached to one bone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitBox {
    pub bone: i32,
    /// Hit group for damage multipliers.
    pub group: i32,
    pub bb_min: [f32; 3],
    pub bb_max: [f32; 3],
}

/// An animation sequence description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence {
    pub label: String,
    pub fps: f32,
    pub flags: i32,
    pub activity: i32,
    pub activity_weight: i32,
    pub event_count: u32,
    pub event_offset: i32,
    pub frame_count: u32,
    pub pivot_count: u32,
    pub pivot_offset: i32,
    pub motion_type: i32,
    pub motion_bone: i32,
    pub linear_movement: [f32; 3],
    pub automove_pos_offset: i32,
    pub automove_angle_offset: i32,
    pub bb_min: [f32; 3],
    pub bb_max: [f32; 3],
    pub blend_count: u32,
    pub anim_offset: i32,
    pub blend_kind: [i32; SEQUENCE_BLEND_COUNT],
    pub blend_start: [f32; SEQUENCE_BLEND_COUNT],
    pub blend_end: [f32; SEQUENCE_BLEND_COUNT],
    pub blend_parent: i32,
    /// Sequence group holding this sequence's animation data. Group 0 is the
    /// primary file; higher groups live in demand-loaded companion files.
    pub group: i32,
    /// Transition graph entry node.
    pub entry_node: i32,
    /// Transition graph exit node.
    pub exit_node: i32,
    pub node_flags: i32,
    pub next_sequence: i32,
}

/// A demand-loaded group of sequences.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceGroup {
    pub label: String,
    pub file_name: String,
    /// Legacy cache pointer, meaningless on disk.
    pub unused1: i32,
    /// Legacy cache pointer, meaningless on disk.
    pub unused2: i32,
}

/// Texture metadata. Pixel data itself is not decoded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Texture {
    pub name: String,
    pub flags: i32,
    pub width: i32,
    pub height: i32,
    /// File offset of the raw pixel data.
    pub data_offset: i32,
}

/// A named group of interchangeable sub-models (e.g. heads, weapons).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyPart {
    pub name: String,
    pub model_count: u32,
    /// Divisor used to select this part's sub-model from a body value.
    pub base: i32,
    pub model_offset: i32,
}

/// A named point on a bone, with an origin and three orientation vectors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attachment {
    pub name: String,
    pub kind: i32,
    pub bone: i32,
    pub origin: [f32; 3],
    pub vectors: [[f32; 3]; ATTACHMENT_VECTOR_COUNT],
}

// --- Winnow record parsers ---

pub(crate) fn parse_bone(input: &mut &[u8]) -> WResult<Bone> {
    let name = parse_fixed_string(input, BONE_NAME_SIZE)?;
    let parent = le_i32.parse_next(input)?;
    let flags = le_i32.parse_next(input)?;
    let mut controller = [0i32; CONTROLLERS_PER_BONE];
    for slot in &mut controller {
        *slot = le_i32.parse_next(input)?;
    }
    let mut default_value = [0f32; CONTROLLERS_PER_BONE];
    for slot in &mut default_value {
        *slot = le_f32.parse_next(input)?;
    }
    let mut scale = [0f32; CONTROLLERS_PER_BONE];
    for slot in &mut scale {
        *slot = le_f32.parse_next(input)?;
    }
    Ok(Bone {
        name,
        parent,
        flags,
        controller,
        default_value,
        scale,
    })
}

pub(crate) fn parse_bone_controller(input: &mut &[u8]) -> WResult<BoneController> {
    let bone = le_i32.parse_next(input)?;
    let kind = le_i32.parse_next(input)?;
    let start = le_f32.parse_next(input)?;
    let end = le_f32.parse_next(input)?;
    let rest = le_i32.parse_next(input)?;
    let index = le_i32.parse_next(input)?;
    Ok(BoneController {
        bone,
        kind,
        start,
        end,
        rest,
        index,
    })
}

pub(crate) fn parse_hitbox(input: &mut &[u8]) -> WResult<HitBox> {
    let bone = le_i32.parse_next(input)?;
    let group = le_i32.parse_next(input)?;
    let bb_min = parse_vec3(input)?;
    let bb_max = parse_vec3(input)?;
    Ok(HitBox {
        bone,
        group,
        bb_min,
        bb_max,
    })
}

pub(crate) fn parse_sequence(input: &mut &[u8]) -> WResult<Sequence> {
    let label = parse_fixed_string(input, SEQUENCE_LABEL_SIZE)?;
    let fps = le_f32.parse_next(input)?;
    let flags = le_i32.parse_next(input)?;
    let activity = le_i32.parse_next(input)?;
    let activity_weight = le_i32.parse_next(input)?;
    let event_count = le_u32.parse_next(input)?;
    let event_offset = le_i32.parse_next(input)?;
    let frame_count = le_u32.parse_next(input)?;
    let pivot_count = le_u32.parse_next(input)?;
    let pivot_offset = le_i32.parse_next(input)?;
    let motion_type = le_i32.parse_next(input)?;
    let motion_bone = le_i32.parse_next(input)?;
    let linear_movement = parse_vec3(input)?;
    let automove_pos_offset = le_i32.parse_next(input)?;
    let automove_angle_offset = le_i32.parse_next(input)?;
    let bb_min = parse_vec3(input)?;
    let bb_max = parse_vec3(input)?;
    let blend_count = le_u32.parse_next(input)?;
    let anim_offset = le_i32.parse_next(input)?;
    let mut blend_kind = [0i32; SEQUENCE_BLEND_COUNT];
    for slot in &mut blend_kind {
        *slot = le_i32.parse_next(input)?;
    }
    let mut blend_start = [0f32; SEQUENCE_BLEND_COUNT];
    for slot in &mut blend_start {
        *slot = le_f32.parse_next(input)?;
    }
    let mut blend_end = [0f32; SEQUENCE_BLEND_COUNT];
    for slot in &mut blend_end {
        *slot = le_f32.parse_next(input)?;
    }
    let blend_parent = le_i32.parse_next(input)?;
    let group = le_i32.parse_next(input)?;
    let entry_node = le_i32.parse_next(input)?;
    let exit_node = le_i32.parse_next(input)?;
    let node_flags = le_i32.parse_next(input)?;
    let next_sequence = le_i32.parse_next(input)?;
    Ok(Sequence {
        label,
        fps,
        flags,
        activity,
        activity_weight,
        event_count,
        event_offset,
        frame_count,
        pivot_count,
        pivot_offset,
        motion_type,
        motion_bone,
        linear_movement,
        automove_pos_offset,
        automove_angle_offset,
        bb_min,
        bb_max,
        blend_count,
        anim_offset,
        blend_kind,
        blend_start,
        blend_end,
        blend_parent,
        group,
        entry_node,
        exit_node,
        node_flags,
        next_sequence,
    })
}

pub(crate) fn parse_sequence_group(input: &mut &[u8]) -> WResult<SequenceGroup> {
    let label = parse_fixed_string(input, SEQUENCE_GROUP_LABEL_SIZE)?;
    let file_name = parse_fixed_string(input, SEQUENCE_GROUP_NAME_SIZE)?;
    let unused1 = le_i32.parse_next(input)?;
    let unused2 = le_i32.parse_next(input)?;
    Ok(SequenceGroup {
        label,
        file_name,
        unused1,
        unused2,
    })
}

pub(crate) fn parse_texture(input: &mut &[u8]) -> WResult<Texture> {
    let name = parse_fixed_string(input, TEXTURE_NAME_SIZE)?;
    let flags = le_i32.parse_next(input)?;
    let width = le_i32.parse_next(input)?;
    let height = le_i32.parse_next(input)?;
    let data_offset = le_i32.parse_next(input)?;
    Ok(Texture {
        name,
        flags,
        width,
        height,
        data_offset,
    })
}

pub(crate) fn parse_body_part(input: &mut &[u8]) -> WResult<BodyPart> {
    let name = parse_fixed_string(input, BODY_PART_NAME_SIZE)?;
    let model_count = le_u32.parse_next(input)?;
    let base = le_i32.parse_next(input)?;
    let model_offset = le_i32.parse_next(input)?;
    Ok(BodyPart {
        name,
        model_count,
        base,
        model_offset,
    })
}

pub(crate) fn parse_attachment(input: &mut &[u8]) -> WResult<Attachment> {
    let name = parse_fixed_string(input, ATTACHMENT_NAME_SIZE)?;
    let kind = le_i32.parse_next(input)?;
    let bone = le_i32.parse_next(input)?;
    let origin = parse_vec3(input)?;
    let mut vectors = [[0f32; 3]; ATTACHMENT_VECTOR_COUNT];
    for vector in &mut vectors {
        *vector = parse_vec3(input)?;
    }
    Ok(Attachment {
        name,
        kind,
        bone,
        origin,
        vectors,
    })
}
