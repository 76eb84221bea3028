//! Typed toolpath model
//! Produced by the parser from the CLS JSON document, consumed by codegen

use cgmath::{Point3, Vector3};

/// A fully parsed toolpath program
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPath {
    pub tool: ToolDescriptor,
    pub start: StartPose,
    pub segments: Vec<Segment>,
    /// Segments dropped because their `type` tag was not recognised
    pub skipped: Vec<SkippedSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPose {
    pub position: Point3<f64>,
    /// Start axis; drill positioning offsets are taken along it
    pub direction: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSegment {
    /// Index within the input `path` array
    pub index: usize,
    pub type_tag: String,
}

/// One toolpath segment, in input order
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Rapid(RapidMove),
    Linear(LinearMove),
    Circular(ArcMove),
    DrillCycle(DrillCycle),
}

impl Segment {
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Rapid(_) => "RAPID",
            Segment::Linear(_) => "linear",
            Segment::Circular(_) => "circle",
            Segment::DrillCycle(_) => "cycle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RapidMove {
    pub point: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMove {
    pub point: [f64; 3],
    pub feedrate: f64,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcMove {
    pub point: [f64; 3],
    /// Tool axis, present when the positional record carried six values
    pub tool_axis: Option<[f64; 3]>,
    pub center: [f64; 3],
    pub radius: f64,
    pub normal: [f64; 3],
    pub feedrate: f64,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillCycle {
    pub cycle_type: String,
    /// Clearance plane
    pub clearance: f64,
    /// Target depth, positive into the material
    pub feed_to_depth: f64,
    pub feedrate: f64,
    pub point: [f64; 3],
    /// Peck increment; zero means a single pass
    pub step: f64,
    pub dwell: Dwell,
}

/// Dwell at the bottom of a drilling cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dwell {
    Revolutions(f64),
    Seconds(f64),
    /// Dwell kind missing or not understood
    Unspecified,
}

impl Dwell {
    pub fn from_kind(kind: Option<&str>, value: f64) -> Self {
        match kind {
            Some("Rev") => Dwell::Revolutions(value),
            Some("Sec") => Dwell::Seconds(value),
            _ => Dwell::Unspecified,
        }
    }
}
