//! Segment parser
//! Loads the CLS toolpath JSON document and normalizes arc and drilling-cycle
//! records into typed parameters

use crate::ast::*;
use crate::lexer::{self, Token};
use crate::modal::CycleParams;
use crate::vocab::MotionMode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema error: `{field}` {reason}")]
    Schema { field: String, reason: String },

    #[error("format error: {record} must hold 3 or 6 values, got {count}")]
    Format { record: String, count: usize },

    #[error("unexpected character at offset {offset} in CLS record `{record}`")]
    Lexer { record: String, offset: usize },

    #[error("expected a {expected} record, got `{record}`")]
    Record { expected: String, record: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Deserialize)]
struct RawTool {
    number: u32,
}

#[derive(Deserialize)]
struct RawRapid {
    point: [f64; 3],
}

#[derive(Deserialize)]
struct RawLinear {
    point: [f64; 3],
    feedrate: f64,
    #[serde(default)]
    speedrate: Option<f64>,
}

#[derive(Deserialize)]
struct RawCircle {
    point: Vec<f64>,
    center: [f64; 3],
    radius: f64,
    normal: [f64; 3],
    feedrate: f64,
    #[serde(default)]
    speedrate: Option<f64>,
}

#[derive(Deserialize)]
struct RawCycle {
    #[serde(default)]
    cycle_type: String,
    clear: f64,
    fedto: f64,
    feedrate: f64,
    point: [f64; 3],
    #[serde(default)]
    step: f64,
    #[serde(default)]
    dwell_type: Option<String>,
    #[serde(default)]
    dwell: Option<f64>,
}

/// Parse the toolpath document: a single-element list holding `tool`,
/// `start_pos`, `start_dir` and `path`.
pub fn parse_document(source: &str) -> Result<ToolPath> {
    let root: Value = serde_json::from_str(source)?;
    let entry = root
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| ParseError::Schema {
            field: "<root>".to_string(),
            reason: "must be a non-empty list".to_string(),
        })?;

    let tool: RawTool = required(entry, "tool")?;
    let start_pos: [f64; 3] = required(entry, "start_pos")?;
    let start_dir: [f64; 3] = required(entry, "start_dir")?;
    let path: Vec<Value> = required(entry, "path")?;

    let mut segments = Vec::with_capacity(path.len());
    let mut skipped = Vec::new();

    for (index, value) in path.iter().enumerate() {
        let tag = value.get("type").and_then(Value::as_str);
        let segment = match tag {
            Some("RAPID") => {
                let raw: RawRapid = segment_fields(value, index)?;
                Segment::Rapid(RapidMove { point: raw.point })
            }
            Some("linear") => {
                let raw: RawLinear = segment_fields(value, index)?;
                Segment::Linear(LinearMove {
                    point: raw.point,
                    feedrate: raw.feedrate,
                    speed: raw.speedrate,
                })
            }
            Some("circle") => {
                let raw: RawCircle = segment_fields(value, index)?;
                let mut arc = normalize_arc(&raw.point, raw.center, raw.normal, raw.radius)?;
                arc.feedrate = raw.feedrate;
                arc.speed = raw.speedrate;
                Segment::Circular(arc)
            }
            Some("cycle") => {
                let raw: RawCycle = segment_fields(value, index)?;
                Segment::DrillCycle(DrillCycle {
                    cycle_type: raw.cycle_type,
                    clearance: raw.clear,
                    feed_to_depth: raw.fedto,
                    feedrate: raw.feedrate,
                    point: raw.point,
                    step: raw.step,
                    dwell: Dwell::from_kind(raw.dwell_type.as_deref(), raw.dwell.unwrap_or(0.0)),
                })
            }
            other => {
                let type_tag = other.unwrap_or("<missing>").to_string();
                warn!(index, %type_tag, "skipping segment with unknown type");
                skipped.push(SkippedSegment { index, type_tag });
                continue;
            }
        };
        segments.push(segment);
    }

    debug!(
        segments = segments.len(),
        skipped = skipped.len(),
        tool = tool.number,
        "parsed toolpath document"
    );

    Ok(ToolPath {
        tool: ToolDescriptor { number: tool.number },
        start: StartPose {
            position: start_pos.into(),
            direction: start_dir.into(),
        },
        segments,
        skipped,
    })
}

fn required<T: DeserializeOwned>(entry: &Value, field: &str) -> Result<T> {
    let value = entry.get(field).ok_or_else(|| ParseError::Schema {
        field: field.to_string(),
        reason: "is missing".to_string(),
    })?;
    T::deserialize(value).map_err(|e| ParseError::Schema {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn segment_fields<T: DeserializeOwned>(value: &Value, index: usize) -> Result<T> {
    T::deserialize(value).map_err(|e| ParseError::Schema {
        field: format!("path[{}]", index),
        reason: e.to_string(),
    })
}

/// Build an arc from its positional record (xyz or xyz+ijk) and geometry.
/// Feed and speed are left for the caller.
pub fn normalize_arc(point: &[f64], center: [f64; 3], normal: [f64; 3], radius: f64) -> Result<ArcMove> {
    let (target, tool_axis) = match *point {
        [x, y, z] => ([x, y, z], None),
        [x, y, z, i, j, k] => ([x, y, z], Some([i, j, k])),
        _ => {
            return Err(ParseError::Format {
                record: "arc point".to_string(),
                count: point.len(),
            })
        }
    };

    Ok(ArcMove {
        point: target,
        tool_axis,
        center,
        radius,
        normal,
        feedrate: 0.0,
        speed: None,
    })
}

/// Arc direction from the normal's Z component alone. Only axis-aligned arcs
/// resolve; anything but exactly +1 or -1 yields `None`.
pub fn arc_direction(normal: [f64; 3]) -> Option<MotionMode> {
    if normal[2] == 1.0 {
        Some(MotionMode::ClockwiseArc)
    } else if normal[2] == -1.0 {
        Some(MotionMode::CounterClockwiseArc)
    } else {
        None
    }
}

/// Minimal dwell written when none is requested; the controller needs a
/// non-zero value to pick the dwelling cycle variant.
pub const DEFAULT_DWELL: f64 = 0.001;

/// Derive the drilling cycle parameters. `previous_z` is the depth
/// coordinate of the point the tool sat at before this cycle.
pub fn normalize_drill(cycle: &DrillCycle, previous_z: f64) -> CycleParams {
    let feed_to = -cycle.feed_to_depth;
    let step = if cycle.step == 0.0 {
        feed_to.abs()
    } else {
        cycle.step
    };
    let dwell = match cycle.dwell {
        Dwell::Revolutions(value) | Dwell::Seconds(value) => value,
        Dwell::Unspecified => DEFAULT_DWELL,
    };

    CycleParams {
        clearance: cycle.clearance,
        feed_to,
        plunge_feed: cycle.feedrate,
        step,
        pre_feed_dwell: 0.0,
        dwell,
        surface_z: cycle.point[2],
        // Negative when the hole starts above the previous point
        retract_delta: previous_z - cycle.point[2],
    }
}

/// Parse a `CIRCLE/...` record and the `GOTO/...` record that ends the arc.
///
/// CIRCLE carries center (3), normal (3) and radius, optionally followed by
/// tolerance and stepping fields which are ignored.
pub fn parse_cls_arc(circle_line: &str, goto_line: &str, feedrate: f64) -> Result<ArcMove> {
    let circle = record_values(circle_line, "CIRCLE")?;
    if circle.len() < 7 {
        return Err(ParseError::Record {
            expected: "CIRCLE".to_string(),
            record: circle_line.to_string(),
        });
    }
    let goto = record_values(goto_line, "GOTO")?;
    if goto.len() != 3 && goto.len() != 6 {
        return Err(ParseError::Format {
            record: "GOTO".to_string(),
            count: goto.len(),
        });
    }

    let mut arc = normalize_arc(
        &goto,
        [circle[0], circle[1], circle[2]],
        [circle[3], circle[4], circle[5]],
        circle[6],
    )?;
    arc.feedrate = feedrate;
    Ok(arc)
}

fn record_values(line: &str, keyword: &str) -> Result<Vec<f64>> {
    let unexpected = || ParseError::Record {
        expected: keyword.to_string(),
        record: line.to_string(),
    };

    let tokens = lexer::lex(line).map_err(|offset| ParseError::Lexer {
        record: line.to_string(),
        offset,
    })?;
    let mut tokens = tokens.into_iter().map(|(token, _)| token);

    match (tokens.next(), tokens.next()) {
        (Some(Token::Word(word)), Some(Token::Slash)) if word == keyword => {}
        _ => return Err(unexpected()),
    }

    let mut values = Vec::new();
    let mut expect_number = true;
    for token in tokens {
        match (token, expect_number) {
            (Token::Number(value), true) => {
                values.push(value);
                expect_number = false;
            }
            (Token::Comma, false) => expect_number = true,
            _ => return Err(unexpected()),
        }
    }

    Ok(values)
}
