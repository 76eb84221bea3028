//! Program generator
//! Threads one modal state through the toolpath and assembles the program

pub mod encoder;

use crate::ast::*;
use crate::config::PostConfig;
use crate::modal::ModalState;
use crate::vocab;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramOutput {
    pub lines: Vec<String>,
    /// Input segments dropped for an unknown type tag
    pub skipped_segments: usize,
}

impl ProgramOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn emit_all(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    /// Program text, one line per entry, newline terminated
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl std::fmt::Display for ProgramOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Generator stages; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Start,
    HeaderEmitted,
    Positioned,
    Streaming,
    FooterEmitted,
    Done,
}

pub struct CodeGenerator {
    config: PostConfig,
    output: ProgramOutput,
    state: ModalState,
    stage: Stage,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::with_config(PostConfig::default())
    }

    pub fn with_config(config: PostConfig) -> Self {
        Self {
            config,
            output: ProgramOutput::new(),
            state: ModalState::new(),
            stage: Stage::Start,
        }
    }

    /// Translate a toolpath. Consumes the generator: a modal state is never
    /// reused across programs.
    pub fn generate(mut self, toolpath: &ToolPath) -> ProgramOutput {
        self.emit_header(&toolpath.tool);
        self.emit_start_position(&toolpath.start);

        self.advance(Stage::Streaming);
        for (index, segment) in toolpath.segments.iter().enumerate() {
            debug!(index, kind = segment.kind(), "encoding segment");
            self.emit_segment(segment, &toolpath.start);
        }

        self.emit_footer();

        self.output.skipped_segments = toolpath.skipped.len();
        info!(
            segments = toolpath.segments.len(),
            skipped = toolpath.skipped.len(),
            lines = self.output.lines.len(),
            "program generated"
        );
        self.advance(Stage::Done);
        self.output
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {:?} -> {:?}", self.stage, next);
        trace!(from = ?self.stage, to = ?next, "generator stage");
        self.stage = next;
    }

    fn emit_header(&mut self, tool: &ToolDescriptor) {
        let name = &self.config.program_name;
        let units = self.config.units.keyword();

        self.output.emit(format!("BEGIN PGM {} {}", name, units));
        self.output.emit(";Begin Operation");
        self.output
            .emit("CYCL DEF 247 DATUM SETTING ~ Q339=+1    ;DATUM NUMBER");
        self.output.emit("PLANE RESET STAY");
        self.output.emit(vocab::SPINDLE_OFF);
        self.output.emit("L C+0 A+0 F1000");
        self.output.emit(
            self.config
                .templates
                .tool_call(tool.number, self.config.spindle_speed),
        );
        self.output
            .emit(format!("{} {}", vocab::SPINDLE_CW, vocab::COOLANT_ON));

        self.advance(Stage::HeaderEmitted);
    }

    fn emit_start_position(&mut self, start: &StartPose) {
        let p = start.position;
        let line = encoder::encode_rapid([p.x, p.y, p.z], &mut self.state);
        self.output.emit(line);
        self.advance(Stage::Positioned);
    }

    fn emit_segment(&mut self, segment: &Segment, start: &StartPose) {
        match segment {
            Segment::Rapid(mv) => {
                let line = encoder::encode_rapid(mv.point, &mut self.state);
                self.output.emit(line);
            }
            Segment::Linear(mv) => {
                let line = encoder::encode_linear(mv, &mut self.state);
                self.output.emit(line);
            }
            Segment::Circular(arc) => {
                let lines = encoder::encode_circular(arc, &mut self.state);
                self.output.emit_all(lines);
            }
            Segment::DrillCycle(cycle) => {
                trace!(cycle_type = %cycle.cycle_type, "drilling cycle");
                let lines = encoder::encode_drill_cycle(
                    cycle,
                    start.direction,
                    self.config.templates,
                    &mut self.state,
                );
                self.output.emit_all(lines);
            }
        }
    }

    fn emit_footer(&mut self) {
        self.output.emit(vocab::COOLANT_OFF);
        for stop in vocab::AUX_STOPS {
            self.output.emit(stop);
        }
        self.output.emit(";REMARK END OF OPERATION");
        self.output.emit(vocab::PROGRAM_END);
        self.output.emit(";End Operation");
        if self.config.templates.closes_program() {
            self.output.emit(format!(
                "END PGM {} {}",
                self.config.program_name,
                self.config.units.keyword()
            ));
        }

        self.advance(Stage::FooterEmitted);
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
