//! Per-move encoders
//!
//! Each encoder reads the modal state, writes only the words that changed and
//! records what it wrote. The state always holds the last *emitted* value of a
//! word, so a sub-tolerance drift that was suppressed does not accumulate.

use cgmath::{Point3, Vector3};

use crate::ast::{ArcMove, DrillCycle, LinearMove};
use crate::config::TemplateStyle;
use crate::modal::{exact_changed, format_speed, format_value, tolerant_changed, ModalState};
use crate::parser::{arc_direction, normalize_drill};
use crate::vocab::{self, letter, CycleParam, MotionMode};

/// Words of one output line
#[derive(Debug, Default)]
struct Block {
    words: Vec<String>,
}

impl Block {
    fn new(keyword: &str) -> Self {
        Self {
            words: vec![keyword.to_string()],
        }
    }

    fn word(&mut self, letter: &str, value: String) {
        self.words.push(format!("{}{}", letter, value));
    }

    fn token(&mut self, token: &str) {
        self.words.push(token.to_string());
    }

    fn finish(self) -> String {
        self.words.join(" ")
    }
}

const AXES: [&str; 3] = [letter::X, letter::Y, letter::Z];

fn axis_slots(state: &mut ModalState) -> [&mut Option<f64>; 3] {
    [&mut state.x, &mut state.y, &mut state.z]
}

/// Positions under the tolerant rule, updating the slots that were written
fn tolerant_axes(block: &mut Block, point: [f64; 3], state: &mut ModalState) {
    for ((axis, value), slot) in AXES.iter().zip(point).zip(axis_slots(state)) {
        if tolerant_changed(value, *slot) {
            block.word(axis, format_value(value));
            *slot = Some(value);
        }
    }
}

fn exact_word(block: &mut Block, letter: &str, value: f64, slot: &mut Option<f64>) {
    if exact_changed(value, *slot) {
        block.word(letter, format_value(value));
        *slot = Some(value);
    }
}

fn speed_word(block: &mut Block, speed: Option<f64>, slot: &mut Option<f64>) {
    if let Some(speed) = speed {
        if exact_changed(speed, *slot) {
            block.word(letter::SPEED, format_speed(speed));
            *slot = Some(speed);
        }
    }
}

/// `L X.. Y.. Z.. F MAX`
///
/// Rapid positions compare by raw equality, unlike feed moves.
pub fn encode_rapid(point: [f64; 3], state: &mut ModalState) -> String {
    let mut block = Block::new(MotionMode::Rapid.token());
    for ((axis, value), slot) in AXES.iter().zip(point).zip(axis_slots(state)) {
        if exact_changed(value, *slot) {
            block.word(axis, format_value(value));
            *slot = Some(value);
        }
    }
    block.token(vocab::RAPID_FEED);
    state.last_point = Some(point);
    block.finish()
}

/// `L X.. Y.. Z.. F.. S..`
pub fn encode_linear(mv: &LinearMove, state: &mut ModalState) -> String {
    let mut block = Block::new(MotionMode::Linear.token());
    tolerant_axes(&mut block, mv.point, state);
    exact_word(&mut block, letter::FEED, mv.feedrate, &mut state.feed);
    speed_word(&mut block, mv.speed, &mut state.speed);
    state.last_point = Some(mv.point);
    block.finish()
}

/// Two lines: the center (`CC X.. Y..`, always written) and the arc end
/// point (`C X.. Y.. Z.. R.. F.. S.. DR±`). The direction token is left out
/// when the normal is not axis-aligned.
pub fn encode_circular(arc: &ArcMove, state: &mut ModalState) -> Vec<String> {
    let mut center = Block::new(vocab::ARC_CENTER);
    center.word(letter::X, format_value(arc.center[0]));
    center.word(letter::Y, format_value(arc.center[1]));

    let mut block = Block::new(vocab::ARC_MOVE);
    tolerant_axes(&mut block, arc.point, state);
    exact_word(&mut block, letter::RADIUS, arc.radius, &mut state.radius);
    exact_word(&mut block, letter::FEED, arc.feedrate, &mut state.feed);
    speed_word(&mut block, arc.speed, &mut state.speed);
    if let Some(mode) = arc_direction(arc.normal) {
        block.token(mode.token());
    }
    state.last_point = Some(arc.point);

    vec![center.finish(), block.finish()]
}

/// Cycle definition (only when a parameter changed), positioning move and
/// cycle call.
///
/// The positioning offset runs along the program's start direction, using its
/// X component for both axes. Q204 is measured from the raw end point of the
/// previous move, which the cycle itself does not replace.
pub fn encode_drill_cycle(
    cycle: &DrillCycle,
    start_direction: Vector3<f64>,
    templates: TemplateStyle,
    state: &mut ModalState,
) -> Vec<String> {
    let previous_z = state.last_point.map_or(cycle.point[2], |p| p[2]);
    let params = normalize_drill(cycle, previous_z);
    let mut lines = Vec::new();

    if params.differs_from(state.cycle.as_ref()) {
        lines.push(templates.cycle_definition().to_string());
        for param in CycleParam::ORDER {
            lines.push(format!("{}={}", param.letter(), format_value(params.get(param))));
        }
        state.cycle = Some(params);
    }

    let reach = params.feed_to.abs();
    let offset = Vector3::new(start_direction.x, start_direction.x, 0.0) * reach;
    let target = Point3::from(cycle.point) + offset;

    let mut position = Block::new(MotionMode::Rapid.token());
    position.word(letter::X, format_value(target.x));
    position.word(letter::Y, format_value(target.y));
    position.token(vocab::RADIUS_COMP_OFF);
    position.token(vocab::RAPID_FEED);
    lines.push(position.finish());
    lines.push(vocab::CYCLE_CALL.to_string());

    state.x = Some(target.x);
    state.y = Some(target.y);

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Dwell;
    use pretty_assertions::assert_eq;

    fn linear(point: [f64; 3], feedrate: f64) -> LinearMove {
        LinearMove {
            point,
            feedrate,
            speed: None,
        }
    }

    fn arc(normal_z: f64) -> ArcMove {
        ArcMove {
            point: [20.0, 10.0, -2.0],
            tool_axis: None,
            center: [10.0, 10.0, -2.0],
            radius: 10.0,
            normal: [0.0, 0.0, normal_z],
            feedrate: 300.0,
            speed: None,
        }
    }

    const CLASSIC: TemplateStyle = TemplateStyle::Classic;

    fn drill() -> DrillCycle {
        DrillCycle {
            cycle_type: "DRILL".to_string(),
            clearance: 2.0,
            feed_to_depth: 10.0,
            feedrate: 150.0,
            point: [40.0, 25.0, 0.0],
            step: 0.0,
            dwell: Dwell::Unspecified,
        }
    }

    #[test]
    fn test_rapid_first_emission_writes_all_axes() {
        let mut state = ModalState::new();
        assert_eq!(encode_rapid([0.0, 0.0, 0.0], &mut state), "L X0 Y0 Z0 F MAX");
        assert_eq!(state, ModalState::seeded([0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_rapid_uses_raw_equality() {
        let mut state = ModalState::seeded([10.0, 0.0, 0.0]);
        // Below the tolerant threshold, still written for rapids
        assert_eq!(encode_rapid([10.0001, 0.0, 0.0], &mut state), "L X10 F MAX");
        assert_eq!(encode_rapid([10.0001, 0.0, 0.0], &mut state), "L F MAX");
    }

    #[test]
    fn test_linear_only_changed_words() {
        let mut state = ModalState::seeded([10.0, 15.0, 5.0]);
        state.feed = Some(100.0);
        assert_eq!(encode_linear(&linear([10.0, 20.0, 5.0], 100.0), &mut state), "L Y20");
    }

    #[test]
    fn test_linear_idempotent() {
        let mut state = ModalState::seeded([0.0, 0.0, 0.0]);
        let mv = linear([5.0, 5.0, -1.0], 80.0);
        assert_eq!(encode_linear(&mv, &mut state), "L X5 Y5 Z-1 F80");
        assert_eq!(encode_linear(&mv, &mut state), "L");
    }

    #[test]
    fn test_linear_tolerant_rounding_boundary() {
        let mut state = ModalState::seeded([10.0004, 0.0, 0.0]);
        state.feed = Some(100.0);
        assert_eq!(encode_linear(&linear([10.0003, 0.0, 0.0], 100.0), &mut state), "L");
        assert_eq!(
            encode_linear(&linear([10.0016, 0.0, 0.0], 100.0), &mut state),
            "L X10.002"
        );
    }

    #[test]
    fn test_suppressed_drift_does_not_accumulate() {
        let mut state = ModalState::seeded([10.0, 0.0, 0.0]);
        state.feed = Some(100.0);
        assert_eq!(encode_linear(&linear([10.0004, 0.0, 0.0], 100.0), &mut state), "L");
        assert_eq!(state.x, Some(10.0));
        assert_eq!(encode_linear(&linear([10.0008, 0.0, 0.0], 100.0), &mut state), "L X10.001");
    }

    #[test]
    fn test_linear_half_step_prints_unchanged() {
        let mut state = ModalState::seeded([0.0, 0.0, 0.0]);
        state.feed = Some(100.0);
        assert_eq!(encode_linear(&linear([0.005, 0.0, 0.0], 100.0), &mut state), "L X0.005");
        assert_eq!(encode_linear(&linear([0.0055, 0.0, 0.0], 100.0), &mut state), "L");
    }

    #[test]
    fn test_linear_speed_is_integer_and_diffed() {
        let mut state = ModalState::seeded([0.0, 0.0, 0.0]);
        let mv = LinearMove {
            point: [1.0, 0.0, 0.0],
            feedrate: 120.5,
            speed: Some(8000.7),
        };
        assert_eq!(encode_linear(&mv, &mut state), "L X1 F120.5 S8000");
        assert_eq!(encode_linear(&mv, &mut state), "L");
    }

    #[test]
    fn test_circular_direction_tokens() {
        let mut state = ModalState::seeded([0.0, 10.0, -2.0]);
        let lines = encode_circular(&arc(1.0), &mut state);
        assert_eq!(lines, vec!["CC X10 Y10", "C X20 R10 F300 DR-"]);
        assert_eq!(state.last_point, Some([20.0, 10.0, -2.0]));

        let mut state = ModalState::seeded([0.0, 10.0, -2.0]);
        let lines = encode_circular(&arc(-1.0), &mut state);
        assert!(lines[1].ends_with("DR+"));

        let mut state = ModalState::seeded([0.0, 10.0, -2.0]);
        let lines = encode_circular(&arc(0.0), &mut state);
        assert_eq!(lines[1], "C X20 R10 F300");
    }

    #[test]
    fn test_circular_center_is_never_diffed() {
        let mut state = ModalState::seeded([0.0, 10.0, -2.0]);
        encode_circular(&arc(1.0), &mut state);
        let lines = encode_circular(&arc(1.0), &mut state);
        assert_eq!(lines, vec!["CC X10 Y10", "C DR-"]);
    }

    #[test]
    fn test_drill_cycle_definition_block() {
        let mut state = ModalState::seeded([40.0, 25.0, 5.0]);
        let lines = encode_drill_cycle(&drill(), Vector3::new(0.0, 0.0, 1.0), CLASSIC, &mut state);
        assert_eq!(
            lines,
            vec![
                "CYCL DEF  200",
                "Q200=2",
                "Q201=-10",
                "Q206=150",
                "Q202=10",
                "Q210=0",
                "Q211=0.001",
                "Q203=0",
                "Q204=5",
                "L X40 Y25 R0 F MAX",
                "CYCL CALL",
            ]
        );
    }

    #[test]
    fn test_drill_cycle_suppresses_repeated_definition() {
        let mut state = ModalState::seeded([40.0, 25.0, 5.0]);
        let dir = Vector3::new(0.0, 0.0, 1.0);
        encode_drill_cycle(&drill(), dir, CLASSIC, &mut state);

        let second = DrillCycle {
            point: [60.0, 25.0, 0.0],
            ..drill()
        };
        let lines = encode_drill_cycle(&second, dir, CLASSIC, &mut state);
        assert_eq!(lines, vec!["L X60 Y25 R0 F MAX", "CYCL CALL"]);
    }

    #[test]
    fn test_drill_offset_reuses_x_component() {
        let mut state = ModalState::seeded([0.0, 0.0, 5.0]);
        let lines = encode_drill_cycle(&drill(), Vector3::new(0.5, 0.0, 0.0), CLASSIC, &mut state);
        // |Q201| = 10, 0.5 * 10 added to both axes
        assert!(lines.contains(&"L X45 Y30 R0 F MAX".to_string()));
        assert_eq!(state.x, Some(45.0));
        assert_eq!(state.y, Some(30.0));
        assert_eq!(state.z, Some(5.0));
    }

    #[test]
    fn test_drill_definition_ignores_half_step_parameters() {
        let mut state = ModalState::seeded([40.0, 25.0, 5.0]);
        let dir = Vector3::new(0.0, 0.0, 1.0);
        let first = DrillCycle {
            clearance: 0.005,
            ..drill()
        };
        encode_drill_cycle(&first, dir, CLASSIC, &mut state);

        let second = DrillCycle {
            clearance: 0.0055,
            ..drill()
        };
        let lines = encode_drill_cycle(&second, dir, CLASSIC, &mut state);
        assert_eq!(lines, vec!["L X40 Y25 R0 F MAX", "CYCL CALL"]);
    }

    #[test]
    fn test_drill_retract_uses_raw_previous_point() {
        let mut state = ModalState::seeded([0.0, 0.0, 5.0]);
        state.feed = Some(100.0);
        // Z drift below the written precision is not emitted
        assert_eq!(encode_linear(&linear([0.0, 0.0, 5.0004], 100.0), &mut state), "L");
        assert_eq!(state.z, Some(5.0));
        assert_eq!(state.last_point, Some([0.0, 0.0, 5.0004]));

        let hole = DrillCycle {
            point: [40.0, 25.0, 0.0008],
            ..drill()
        };
        let lines = encode_drill_cycle(&hole, Vector3::new(0.0, 0.0, 1.0), CLASSIC, &mut state);
        assert!(lines.contains(&"Q203=0.001".to_string()));
        // 5.0004 - 0.0008, not 5 - 0.0008
        assert!(lines.contains(&"Q204=5".to_string()));
        assert_eq!(state.last_point, Some([0.0, 0.0, 5.0004]));
    }

    #[test]
    fn test_normalized_definition_token() {
        let mut state = ModalState::seeded([40.0, 25.0, 5.0]);
        let lines = encode_drill_cycle(
            &drill(),
            Vector3::new(0.0, 0.0, 1.0),
            TemplateStyle::Normalized,
            &mut state,
        );
        assert_eq!(lines[0], "CYCL DEF 200");
    }
}
