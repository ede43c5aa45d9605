//! Synthetic studio model files shared by the decoder and loader tests.
//!
//! Builds byte-exact files in memory so tests do not depend on fixture
//! files. Sections are laid out after the header in the order bones,
//! sequences, sequence groups, textures, skins, transitions.

use crate::mdl::header::{
    HEADER_NAME_SIZE, IDENT_MDL, IDENT_SEQ, MODEL_HEADER_SIZE, SEQUENCE_HEADER_SIZE, VERSION,
};
use crate::mdl::records::{
    BONE_NAME_SIZE, CONTROLLERS_PER_BONE, SEQUENCE_BLEND_COUNT, SEQUENCE_GROUP_LABEL_SIZE,
    SEQUENCE_GROUP_NAME_SIZE, SEQUENCE_LABEL_SIZE, TEXTURE_NAME_SIZE,
};

pub fn push_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_i16(buf: &mut Vec<u8>, value: i16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_vec3(buf: &mut Vec<u8>, value: [f32; 3]) {
    for component in value {
        push_f32(buf, component);
    }
}

/// Write `name` NUL-padded to `width` bytes.
pub fn push_name(buf: &mut Vec<u8>, name: &str, width: usize) {
    assert!(name.len() <= width, "name too long for a {width}-byte field");
    buf.extend_from_slice(name.as_bytes());
    buf.resize(buf.len() + (width - name.len()), 0);
}

/// Builds a model file with a configurable subset of sections.
///
/// Knobless sections (bone controllers, hit boxes, body parts, attachments,
/// sound fields) are written with zero counts; their record layouts are
/// covered by the record parser tests.
pub struct ModelFileBuilder {
    name: String,
    ident: u32,
    version: i32,
    bones: Vec<String>,
    sequences: Vec<u32>,
    sequence_group_count: u32,
    textures: Vec<String>,
    skins: Vec<i16>,
    transitions: Vec<u8>,
}

impl ModelFileBuilder {
    pub fn new(name: &str) -> Self {
        ModelFileBuilder {
            name: name.to_owned(),
            ident: IDENT_MDL,
            version: VERSION,
            bones: Vec::new(),
            sequences: Vec::new(),
            // every real model is its own sequence group 0
            sequence_group_count: 1,
            textures: Vec::new(),
            skins: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn ident(mut self, ident: u32) -> Self {
        self.ident = ident;
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn bones(mut self, names: &[&str]) -> Self {
        self.bones = names.iter().map(|name| (*name).to_owned()).collect();
        self
    }

    /// One sequence per entry, each with the given frame count.
    pub fn sequences(mut self, frame_counts: &[u32]) -> Self {
        self.sequences = frame_counts.to_vec();
        self
    }

    /// Total group count including group 0 (the file itself).
    pub fn sequence_groups(mut self, count: u32) -> Self {
        self.sequence_group_count = count;
        self
    }

    pub fn textures(mut self, names: &[&str]) -> Self {
        self.textures = names.iter().map(|name| (*name).to_owned()).collect();
        self
    }

    pub fn skins(mut self, refs: &[i16]) -> Self {
        self.skins = refs.to_vec();
        self
    }

    pub fn transitions(mut self, weights: &[u8]) -> Self {
        self.transitions = weights.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bones = Vec::new();
        for name in &self.bones {
            push_name(&mut bones, name, BONE_NAME_SIZE);
            push_i32(&mut bones, -1); // parent
            push_i32(&mut bones, 0); // flags
            for _ in 0..CONTROLLERS_PER_BONE {
                push_i32(&mut bones, -1);
            }
            for _ in 0..CONTROLLERS_PER_BONE {
                push_f32(&mut bones, 0.0);
            }
            for _ in 0..CONTROLLERS_PER_BONE {
                push_f32(&mut bones, 1.0);
            }
        }

        let mut sequences = Vec::new();
        for (i, frames) in self.sequences.iter().enumerate() {
            push_name(&mut sequences, &format!("seq{i:02}"), SEQUENCE_LABEL_SIZE);
            push_f32(&mut sequences, 30.0); // fps
            push_i32(&mut sequences, 0); // flags
            push_i32(&mut sequences, 0); // activity
            push_i32(&mut sequences, 0); // activity_weight
            push_u32(&mut sequences, 0); // event_count
            push_i32(&mut sequences, 0); // event_offset
            push_u32(&mut sequences, *frames); // frame_count
            push_u32(&mut sequences, 0); // pivot_count
            push_i32(&mut sequences, 0); // pivot_offset
            push_i32(&mut sequences, 0); // motion_type
            push_i32(&mut sequences, 0); // motion_bone
            push_vec3(&mut sequences, [0.0; 3]); // linear_movement
            push_i32(&mut sequences, 0); // automove_pos_offset
            push_i32(&mut sequences, 0); // automove_angle_offset
            push_vec3(&mut sequences, [0.0; 3]); // bb_min
            push_vec3(&mut sequences, [0.0; 3]); // bb_max
            push_u32(&mut sequences, 1); // blend_count
            push_i32(&mut sequences, 0); // anim_offset
            for _ in 0..SEQUENCE_BLEND_COUNT {
                push_i32(&mut sequences, 0); // blend_kind
            }
            for _ in 0..SEQUENCE_BLEND_COUNT {
                push_f32(&mut sequences, 0.0); // blend_start
            }
            for _ in 0..SEQUENCE_BLEND_COUNT {
                push_f32(&mut sequences, 0.0); // blend_end
            }
            push_i32(&mut sequences, 0); // blend_parent
            push_i32(&mut sequences, 0); // group
            push_i32(&mut sequences, 0); // entry_node
            push_i32(&mut sequences, 0); // exit_node
            push_i32(&mut sequences, 0); // node_flags
            push_i32(&mut sequences, 0); // next_sequence
        }

        let mut groups = Vec::new();
        for i in 0..self.sequence_group_count {
            push_name(&mut groups, &format!("group{i}"), SEQUENCE_GROUP_LABEL_SIZE);
            push_name(&mut groups, "", SEQUENCE_GROUP_NAME_SIZE);
            push_i32(&mut groups, 0);
            push_i32(&mut groups, 0);
        }

        let mut textures = Vec::new();
        for name in &self.textures {
            push_name(&mut textures, name, TEXTURE_NAME_SIZE);
            push_i32(&mut textures, 0); // flags
            push_i32(&mut textures, 64); // width
            push_i32(&mut textures, 64); // height
            push_i32(&mut textures, 0); // data_offset
        }

        let mut skins = Vec::new();
        for skin_ref in &self.skins {
            push_i16(&mut skins, *skin_ref);
        }

        let bones_offset = MODEL_HEADER_SIZE;
        let sequences_offset = bones_offset + bones.len();
        let groups_offset = sequences_offset + sequences.len();
        let textures_offset = groups_offset + groups.len();
        let skins_offset = textures_offset + textures.len();
        let transitions_offset = skins_offset + skins.len();
        let total = transitions_offset + self.transitions.len();

        let mut data = Vec::with_capacity(total);
        push_u32(&mut data, self.ident);
        push_i32(&mut data, self.version);
        push_name(&mut data, &self.name, HEADER_NAME_SIZE);
        push_i32(&mut data, total as i32); // length
        push_vec3(&mut data, [0.0, 0.0, 64.0]); // eye_position
        push_vec3(&mut data, [-16.0, -16.0, 0.0]); // hull_min
        push_vec3(&mut data, [16.0, 16.0, 72.0]); // hull_max
        push_vec3(&mut data, [-16.0, -16.0, 0.0]); // clip_min
        push_vec3(&mut data, [16.0, 16.0, 72.0]); // clip_max
        push_i32(&mut data, 0); // flags
        push_u32(&mut data, self.bones.len() as u32);
        push_i32(&mut data, bones_offset as i32);
        push_u32(&mut data, 0); // bone controllers
        push_i32(&mut data, 0);
        push_u32(&mut data, 0); // hit boxes
        push_i32(&mut data, 0);
        push_u32(&mut data, self.sequences.len() as u32);
        push_i32(&mut data, sequences_offset as i32);
        push_u32(&mut data, self.sequence_group_count);
        push_i32(&mut data, groups_offset as i32);
        push_u32(&mut data, self.textures.len() as u32);
        push_i32(&mut data, textures_offset as i32);
        push_i32(&mut data, 0); // texture_data_offset
        push_u32(&mut data, self.skins.len() as u32); // skin_ref_count
        push_u32(&mut data, u32::from(!self.skins.is_empty())); // skin_family_count
        push_i32(&mut data, skins_offset as i32);
        push_u32(&mut data, 0); // body parts
        push_i32(&mut data, 0);
        push_u32(&mut data, 0); // attachments
        push_i32(&mut data, 0);
        push_u32(&mut data, 0); // sound_table
        push_i32(&mut data, 0);
        push_u32(&mut data, 0); // sound groups
        push_i32(&mut data, 0);
        push_u32(&mut data, self.transitions.len() as u32);
        push_i32(&mut data, transitions_offset as i32);
        assert_eq!(data.len(), MODEL_HEADER_SIZE);

        data.extend_from_slice(&bones);
        data.extend_from_slice(&sequences);
        data.extend_from_slice(&groups);
        data.extend_from_slice(&textures);
        data.extend_from_slice(&skins);
        data.extend_from_slice(&self.transitions);
        assert_eq!(data.len(), total);
        data
    }
}

/// A well-formed 76-byte sequence group file.
pub fn sequence_file(name: &str) -> Vec<u8> {
    sequence_file_with(IDENT_SEQ, VERSION, name)
}

/// A sequence group file with an arbitrary ident and version.
pub fn sequence_file_with(ident: u32, version: i32, name: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(SEQUENCE_HEADER_SIZE);
    push_u32(&mut data, ident);
    push_i32(&mut data, version);
    push_name(&mut data, name, HEADER_NAME_SIZE);
    push_i32(&mut data, SEQUENCE_HEADER_SIZE as i32); // length
    data
}
