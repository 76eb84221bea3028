//! Post passes over a generated program
//!
//! Passes run after generation, in order, each producing a new program.

use std::collections::HashMap;

use crate::codegen::ProgramOutput;
use crate::config::PostConfig;
use crate::vocab::ModeCategory;

/// A transformation applied to the finished program text
pub trait PostProcessor {
    fn process(&self, input: &ProgramOutput) -> ProgramOutput;

    fn name(&self) -> &str;
}

/// Passes enabled by `config`, in application order
pub fn pipeline(config: &PostConfig) -> Vec<Box<dyn PostProcessor>> {
    let mut passes: Vec<Box<dyn PostProcessor>> = Vec::new();
    if config.collapse_modal_words {
        passes.push(Box::new(ModalWordFilter::new()));
    }
    if config.line_numbers {
        passes.push(Box::new(LineNumberer {
            start: config.line_number_start,
            step: config.line_number_step,
        }));
    }
    passes
}

/// Removes mode words (motion keyword, plane, coordinate mode) that repeat
/// the active word of their category.
///
/// A line that loses every word to the filter is dropped; lines that were
/// blank to begin with are kept. Off unless `collapse_modal_words` is set.
#[derive(Debug, Clone, Default)]
pub struct ModalWordFilter {
    initial: HashMap<ModeCategory, String>,
}

impl ModalWordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `word` as already active before the first line
    pub fn with_active(mut self, word: &str) -> Self {
        if let Some(category) = ModeCategory::of(word) {
            self.initial.insert(category, word.to_string());
        }
        self
    }
}

impl PostProcessor for ModalWordFilter {
    fn process(&self, input: &ProgramOutput) -> ProgramOutput {
        let mut active = self.initial.clone();
        let mut lines = Vec::with_capacity(input.lines.len());

        for line in &input.lines {
            if line.trim().is_empty() {
                lines.push(line.clone());
                continue;
            }

            // Comments carry free text, never mode words
            if line.trim_start().starts_with(';') {
                lines.push(line.clone());
                continue;
            }

            let mut removed = false;
            let mut kept = Vec::new();
            for word in line.split_whitespace() {
                match ModeCategory::of(word) {
                    Some(category) if active.get(&category).map(String::as_str) == Some(word) => {
                        removed = true;
                    }
                    Some(category) => {
                        active.insert(category, word.to_string());
                        kept.push(word);
                    }
                    None => kept.push(word),
                }
            }

            if !removed {
                lines.push(line.clone());
            } else if !kept.is_empty() {
                lines.push(kept.join(" "));
            }
        }

        ProgramOutput {
            lines,
            skipped_segments: input.skipped_segments,
        }
    }

    fn name(&self) -> &str {
        "modal word filter"
    }
}

/// Prefixes every line with `N<number>`
#[derive(Debug, Clone, Copy)]
pub struct LineNumberer {
    pub start: u32,
    pub step: u32,
}

impl Default for LineNumberer {
    fn default() -> Self {
        Self { start: 10, step: 10 }
    }
}

impl PostProcessor for LineNumberer {
    fn process(&self, input: &ProgramOutput) -> ProgramOutput {
        let lines = input
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("N{} {}", self.start + self.step * i as u32, line))
            .collect();

        ProgramOutput {
            lines,
            skipped_segments: input.skipped_segments,
        }
    }

    fn name(&self) -> &str {
        "line numbers"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CodeGenerator;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn program(lines: &[&str]) -> ProgramOutput {
        ProgramOutput {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            skipped_segments: 0,
        }
    }

    #[test]
    fn test_modal_filter_drops_repeated_words() {
        let input = program(&[
            "G90 G17",
            "G81 X10 Y10",
            "G81 X20 Y10",
            "G17",
            "G83 X30",
            "G81 X40",
        ]);
        let output = ModalWordFilter::new().process(&input);

        // G83 is not a mode word, so G81 stays active across it
        assert_eq!(
            output.lines,
            vec!["G90 G17", "G81 X10 Y10", "X20 Y10", "G83 X30", "X40"]
        );
    }

    #[test]
    fn test_modal_filter_collapses_generated_program() {
        let source = r#"[{"tool": {"number": 7}, "start_pos": [0, 0, 50], "start_dir": [0, 0, 1],
            "path": [
                {"type": "linear", "point": [10, 0, 50], "feedrate": 100},
                {"type": "circle", "point": [0, 10, 50], "center": [0, 0, 50],
                 "radius": 10, "normal": [0, 0, 1], "feedrate": 100},
                {"type": "circle", "point": [-10, 0, 50], "center": [0, 0, 50],
                 "radius": 10, "normal": [0, 0, 1], "feedrate": 100},
                {"type": "linear", "point": [-10, 0, 50], "feedrate": 100}
            ]}]"#;
        let toolpath = parse_document(source).unwrap();
        let generated = CodeGenerator::new().generate(&toolpath);
        assert!(generated.lines.contains(&"L".to_string()));

        let output = ModalWordFilter::new().process(&generated);

        // The header's `L C+0 A+0 F1000` makes L active for every later move
        assert_eq!(
            &output.lines[5..15],
            &[
                "L C+0 A+0 F1000",
                "TOOL CALL7 Z S12000",
                "M3 M8",
                "X0 Y0 Z50 F MAX",
                "X10 F100",
                "CC X0 Y0",
                "C X0 Y10 R10 DR-",
                "CC X0 Y0",
                "C X-10 Y0",
                "M9",
            ]
        );
        // The bare repeated `L` line is gone
        assert_eq!(output.lines.len(), generated.lines.len() - 1);
    }

    #[test]
    fn test_modal_filter_keeps_comments_and_blank_lines() {
        let input = program(&["", ";REMARK L G81"]);
        let output = ModalWordFilter::new().process(&input);
        assert_eq!(output.lines, input.lines);
    }

    #[test]
    fn test_modal_filter_initial_state() {
        let input = program(&["G90", "G91 X5"]);
        let output = ModalWordFilter::new().with_active("G90").process(&input);
        assert_eq!(output.lines, vec!["G91 X5"]);
    }

    #[test]
    fn test_line_numbers() {
        let input = program(&["BEGIN PGM program MM", "M30"]);
        let output = LineNumberer::default().process(&input);
        assert_eq!(output.lines, vec!["N10 BEGIN PGM program MM", "N20 M30"]);

        let output = LineNumberer { start: 1, step: 1 }.process(&input);
        assert_eq!(output.lines, vec!["N1 BEGIN PGM program MM", "N2 M30"]);
    }

    #[test]
    fn test_pipeline_follows_config() {
        let names = |config: &PostConfig| -> Vec<String> {
            pipeline(config).iter().map(|p| p.name().to_string()).collect()
        };

        assert!(names(&PostConfig::default()).is_empty());
        assert_eq!(
            names(&PostConfig::default().with_line_numbers(true)),
            vec!["line numbers"]
        );
        assert_eq!(
            names(
                &PostConfig::default()
                    .with_collapse_modal_words(true)
                    .with_line_numbers(true)
            ),
            vec!["modal word filter", "line numbers"]
        );
    }
}
