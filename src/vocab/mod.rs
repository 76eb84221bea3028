//! Command vocabulary for the conversational three-axis dialect
//!
//! Every table here is a plain `match` over `&'static str`, so lookups are
//! free of allocation and can be shared by any number of translations.

/// Motion modes the encoders can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionMode {
    Rapid,
    Linear,
    ClockwiseArc,
    CounterClockwiseArc,
    Drilling,
    DrillingWithDwell,
    DeepDrill,
    PeckDrilling,
    Boring,
    BoringWithDwell,
}

impl MotionMode {
    pub const ALL: [MotionMode; 10] = [
        MotionMode::Rapid,
        MotionMode::Linear,
        MotionMode::ClockwiseArc,
        MotionMode::CounterClockwiseArc,
        MotionMode::Drilling,
        MotionMode::DrillingWithDwell,
        MotionMode::DeepDrill,
        MotionMode::PeckDrilling,
        MotionMode::Boring,
        MotionMode::BoringWithDwell,
    ];

    /// Output token for this mode
    pub fn token(self) -> &'static str {
        match self {
            // Rapid and feed moves share the block keyword; the feed word differs
            MotionMode::Rapid | MotionMode::Linear => "L",
            MotionMode::ClockwiseArc => "DR-",
            MotionMode::CounterClockwiseArc => "DR+",
            MotionMode::Drilling => "G81",
            MotionMode::DrillingWithDwell => "G82",
            MotionMode::DeepDrill => "G83",
            MotionMode::PeckDrilling => "G73",
            MotionMode::Boring => "G85",
            MotionMode::BoringWithDwell => "G89",
        }
    }

    /// Semantic name used by upstream tools
    pub fn name(self) -> &'static str {
        match self {
            MotionMode::Rapid => "Rapid_Move",
            MotionMode::Linear => "Linear_Move",
            MotionMode::ClockwiseArc => "CLW_Arc",
            MotionMode::CounterClockwiseArc => "CCLW_Arc",
            MotionMode::Drilling => "Drilling",
            MotionMode::DrillingWithDwell => "Drilling_with_Dwell",
            MotionMode::DeepDrill => "Deep_Drill",
            MotionMode::PeckDrilling => "Peck_Drilling",
            MotionMode::Boring => "Boring",
            MotionMode::BoringWithDwell => "Boring_with_Dwell",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }
}

/// Look up a motion token by semantic name. Unknown names yield `None`,
/// which callers treat as "omit the word".
pub fn motion_token(name: &str) -> Option<&'static str> {
    MotionMode::from_name(name).map(MotionMode::token)
}

/// Working plane selection
pub fn plane_token(name: &str) -> Option<&'static str> {
    match name {
        "XY_Plane" => Some("G17"),
        "XZ_Plane" => Some("G18"),
        "YZ_Plane" => Some("G19"),
        _ => None,
    }
}

/// Coordinate mode selection
pub fn coordinate_token(name: &str) -> Option<&'static str> {
    match name {
        "Absolute" => Some("G90"),
        "Incremental" => Some("G91"),
        "Coordinate_Reset" => Some("G92"),
        _ => None,
    }
}

/// Auxiliary (M) functions
pub fn aux_token(name: &str) -> Option<&'static str> {
    match name {
        "Stop_Manual_Tool_Change" => Some("M00"),
        "Optional_Stop" => Some("M01"),
        "Program_End" => Some("M02"),
        "Spindle_CW" => Some(SPINDLE_CW),
        "Spindle_CCW" => Some(SPINDLE_CCW),
        "Spindle_Off" => Some(SPINDLE_OFF),
        "Tool_Change" => Some("M06"),
        "Mist_Coolant" => Some("M07"),
        "Coolant_On" | "Liquid_Coolant" => Some(COOLANT_ON),
        "Coolant_Off" => Some(COOLANT_OFF),
        "Coolant_Thru_Spindle" => Some("M26"),
        "Coolant_Tapping" => Some("M27"),
        "Rewind" => Some(PROGRAM_END),
        _ => None,
    }
}

// Short forms used by the program templates
pub const SPINDLE_CW: &str = "M3";
pub const SPINDLE_CCW: &str = "M4";
pub const SPINDLE_OFF: &str = "M5";
pub const COOLANT_ON: &str = "M8";
pub const COOLANT_OFF: &str = "M9";
pub const PROGRAM_END: &str = "M30";
pub const AUX_STOPS: [&str; 2] = ["M127", "M129"];

/// Feed word of a rapid traversal
pub const RAPID_FEED: &str = "F MAX";
/// Radius compensation off, written on cycle positioning moves
pub const RADIUS_COMP_OFF: &str = "R0";
pub const ARC_CENTER: &str = "CC";
pub const ARC_MOVE: &str = "C";
pub const CYCLE_CALL: &str = "CYCL CALL";

/// Parameter letters
pub mod letter {
    pub const X: &str = "X";
    pub const Y: &str = "Y";
    pub const Z: &str = "Z";
    pub const FEED: &str = "F";
    pub const SPEED: &str = "S";
    pub const RADIUS: &str = "R";
}

/// Drilling-cycle Q-parameters, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleParam {
    Clearance,
    FeedTo,
    PlungeFeed,
    Step,
    PreFeedDwell,
    Dwell,
    SurfaceZ,
    RetractDelta,
}

impl CycleParam {
    pub const ORDER: [CycleParam; 8] = [
        CycleParam::Clearance,
        CycleParam::FeedTo,
        CycleParam::PlungeFeed,
        CycleParam::Step,
        CycleParam::PreFeedDwell,
        CycleParam::Dwell,
        CycleParam::SurfaceZ,
        CycleParam::RetractDelta,
    ];

    pub fn letter(self) -> &'static str {
        match self {
            CycleParam::Clearance => "Q200",
            CycleParam::FeedTo => "Q201",
            CycleParam::PlungeFeed => "Q206",
            CycleParam::Step => "Q202",
            CycleParam::PreFeedDwell => "Q210",
            CycleParam::Dwell => "Q211",
            CycleParam::SurfaceZ => "Q203",
            CycleParam::RetractDelta => "Q204",
        }
    }
}

/// Categories of modal mode words. A word stays active until another word of
/// the same category replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeCategory {
    Motion,
    Plane,
    Coordinates,
}

impl ModeCategory {
    /// Category of a mode word, or `None` for ordinary words
    pub fn of(word: &str) -> Option<Self> {
        match word {
            "L" | "DR-" | "DR+" | "G81" => Some(ModeCategory::Motion),
            "G17" | "G18" | "G19" => Some(ModeCategory::Plane),
            "G90" | "G91" | "G92" => Some(ModeCategory::Coordinates),
            _ => None,
        }
    }
}
