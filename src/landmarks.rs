//! Static landmark tables and the column layout derived from them.
//!
//! Every output table has 138 landmarks in a fixed order: 25 BODY_25 body
//! points, one `Background` slot, 21 left hand points, 21 right hand points
//! and 70 face points. Each landmark spans one column per coordinate.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Total number of landmarks in a frame record
pub const N_POINTS: usize = 138;

/// Names of the four header levels, outermost first
pub const LEVEL_NAMES: [&str; 4] = ["Pose Set", "Body Part", "Point", "Coordinate"];

const BODY_POINT_NAMES: [&str; 26] = [
    "Nose",
    "Neck",
    "RShoulder",
    "RElbow",
    "RWrist",
    "LShoulder",
    "LElbow",
    "LWrist",
    "MidHip",
    "RHip",
    "RKnee",
    "RAnkle",
    "LHip",
    "LKnee",
    "LAnkle",
    "REye",
    "LEye",
    "REar",
    "LEar",
    "LBigToe",
    "LSmallToe",
    "LHeel",
    "RBigToe",
    "RSmallToe",
    "RHeel",
    "Background",
];

const BODY_COMPONENTS: [&str; 26] = [
    "Head",
    "Torso",
    "Torso",
    "RArm",
    "RArm",
    "Torso",
    "LArm",
    "LArm",
    "Torso",
    "Torso",
    "RLeg",
    "RLeg",
    "Torso",
    "LLeg",
    "LLeg",
    "Head",
    "Head",
    "Head",
    "Head",
    "LLeg",
    "LLeg",
    "LLeg",
    "RLeg",
    "RLeg",
    "RLeg",
    "Background",
];

const HAND_POINT_NAMES: [&str; 21] = [
    "Wrist", "Base", "Proximal", "Distal", "Tip", "Base", "Proximal", "Distal", "Tip", "Base",
    "Proximal", "Distal", "Tip", "Base", "Proximal", "Distal", "Tip", "Base", "Proximal",
    "Distal", "Tip",
];

const HAND_COMPONENTS: [&str; 21] = [
    "Palm", "Palm", "Thumb", "Thumb", "Thumb", "Palm", "Pointer", "Pointer", "Pointer", "Palm",
    "Middle", "Middle", "Middle", "Palm", "Ring", "Ring", "Ring", "Palm", "Pinky", "Pinky",
    "Pinky",
];

const FACE_POINT_COUNT: usize = 70;
const FACE_PLACEHOLDER: &str = "placeholder";

/// Coordinate layout of the estimator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoseDimensions {
    /// x, y, confidence
    #[serde(rename = "2d")]
    TwoD,
    /// x, y, z, confidence
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
}

impl PoseDimensions {
    /// Number of values per landmark, confidence included
    pub fn coords(&self) -> usize {
        self.axis_labels().len()
    }

    /// Per-landmark coordinate labels in column order
    pub fn axis_labels(&self) -> &'static [&'static str] {
        match self {
            PoseDimensions::TwoD => &["x", "y", "c"],
            PoseDimensions::ThreeD => &["x", "y", "z", "c"],
        }
    }

    /// Number of columns in one frame record
    pub fn columns(&self) -> usize {
        N_POINTS * self.coords()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoseDimensions::TwoD => "2d",
            PoseDimensions::ThreeD => "3d",
        }
    }
}

/// One of the four keypoint groups reported per detected person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Body,
    LeftHand,
    RightHand,
    Face,
}

impl Block {
    pub const ALL: [Block; 4] = [Block::Body, Block::LeftHand, Block::RightHand, Block::Face];

    /// Index of the block's first landmark in the 138-point layout
    pub fn first_point(&self) -> usize {
        match self {
            Block::Body => 0,
            Block::LeftHand => 26,
            Block::RightHand => 47,
            Block::Face => 68,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Block::Body => 25,
            Block::LeftHand | Block::RightHand => 21,
            Block::Face => FACE_POINT_COUNT,
        }
    }

    pub fn pose_set(&self) -> &'static str {
        match self {
            Block::Body => "Body",
            Block::LeftHand => "L Hand",
            Block::RightHand => "R Hand",
            Block::Face => "Face",
        }
    }

    fn key_stem(&self) -> &'static str {
        match self {
            Block::Body => "pose_keypoints",
            Block::LeftHand => "hand_left_keypoints",
            Block::RightHand => "hand_right_keypoints",
            Block::Face => "face_keypoints",
        }
    }

    /// OpenPose JSON key for this block, e.g. `pose_keypoints_3d`
    pub fn default_key(&self, dims: PoseDimensions) -> String {
        format!("{}_{}", self.key_stem(), dims.as_str())
    }

    /// Columns reserved for this block in a frame record
    pub fn column_range(&self, dims: PoseDimensions) -> Range<usize> {
        let coords = dims.coords();
        let start = self.first_point() * coords;
        start..start + self.point_count() * coords
    }
}

/// Repeat each name `n_coords` times in place, so the result lines up with
/// the per-coordinate columns.
pub fn expand_names<T: Clone>(base_names: &[T], n_coords: usize) -> Vec<T> {
    let mut expanded = Vec::with_capacity(base_names.len() * n_coords);
    for name in base_names {
        expanded.extend(std::iter::repeat(name.clone()).take(n_coords));
    }
    expanded
}

/// Landmark names for all 138 points
pub fn point_names() -> Vec<&'static str> {
    let mut names = Vec::with_capacity(N_POINTS);
    names.extend_from_slice(&BODY_POINT_NAMES);
    names.extend_from_slice(&HAND_POINT_NAMES);
    names.extend_from_slice(&HAND_POINT_NAMES);
    names.extend(std::iter::repeat(FACE_PLACEHOLDER).take(FACE_POINT_COUNT));
    names
}

/// Coarse body part each of the 138 points belongs to
pub fn body_parts() -> Vec<&'static str> {
    let mut parts = Vec::with_capacity(N_POINTS);
    parts.extend_from_slice(&BODY_COMPONENTS);
    parts.extend_from_slice(&HAND_COMPONENTS);
    parts.extend_from_slice(&HAND_COMPONENTS);
    parts.extend(std::iter::repeat(FACE_PLACEHOLDER).take(FACE_POINT_COUNT));
    parts
}

/// Pose set of each of the 138 points. The background slot counts as body.
pub fn pose_sets() -> Vec<&'static str> {
    let mut sets = Vec::with_capacity(N_POINTS);
    sets.extend(std::iter::repeat(Block::Body.pose_set()).take(BODY_POINT_NAMES.len()));
    for block in [Block::LeftHand, Block::RightHand, Block::Face] {
        sets.extend(std::iter::repeat(block.pose_set()).take(block.point_count()));
    }
    sets
}

/// Four-level column label shared by every table with the same dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    pub pose_sets: Vec<&'static str>,
    pub body_parts: Vec<&'static str>,
    pub points: Vec<&'static str>,
    pub coordinates: Vec<&'static str>,
}

impl ColumnHeader {
    pub fn new(dims: PoseDimensions) -> Self {
        let coords = dims.coords();
        let coordinates = dims
            .axis_labels()
            .iter()
            .copied()
            .cycle()
            .take(dims.columns())
            .collect();

        Self {
            pose_sets: expand_names(&pose_sets(), coords),
            body_parts: expand_names(&body_parts(), coords),
            points: expand_names(&point_names(), coords),
            coordinates,
        }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Header rows in `LEVEL_NAMES` order
    pub fn levels(&self) -> [(&'static str, &[&'static str]); 4] {
        [
            (LEVEL_NAMES[0], self.pose_sets.as_slice()),
            (LEVEL_NAMES[1], self.body_parts.as_slice()),
            (LEVEL_NAMES[2], self.points.as_slice()),
            (LEVEL_NAMES[3], self.coordinates.as_slice()),
        ]
    }

    /// The four labels of a single column
    pub fn column(&self, index: usize) -> Option<[&'static str; 4]> {
        Some([
            *self.pose_sets.get(index)?,
            *self.body_parts.get(index)?,
            *self.points.get(index)?,
            *self.coordinates.get(index)?,
        ])
    }
}
