//! IPP keyword vocabularies used to validate number-up rules.

/// Sentinel meaning "no constraint" for optional keyword values.
pub const NONE_SENTINEL: &str = "none";

/// Canonical PDF page rotations.
pub const PDF_ROTATIONS: [i32; 4] = [0, 90, 180, 270];

/// Supported `number-up` values.
pub const NUMBER_UP_VALUES: &[&str] = &["1", "2", "4", "6", "9", "16"];

/// `orientation-requested` enum values: portrait, landscape,
/// reverse-landscape, reverse-portrait.
pub const ORIENTATION_REQUESTED_VALUES: &[&str] = &["3", "4", "5", "6"];

/// `number-up-layout` keywords (left-right-top-bottom and friends).
pub const NUMBER_UP_LAYOUT_VALUES: &[&str] = &[
    "lrtb", "lrbt", "rltb", "rlbt", "tblr", "tbrl", "btlr", "btrl",
];

/// Parse a PDF rotation, accepting only the canonical values.
pub fn parse_pdf_rotation(value: &str) -> Option<i32> {
    value
        .parse::<i32>()
        .ok()
        .filter(|rotation| PDF_ROTATIONS.contains(rotation))
}

pub fn is_number_up(value: &str) -> bool {
    NUMBER_UP_VALUES.contains(&value)
}

pub fn is_orientation_requested(value: &str) -> bool {
    ORIENTATION_REQUESTED_VALUES.contains(&value)
}

pub fn is_number_up_layout(value: &str) -> bool {
    NUMBER_UP_LAYOUT_VALUES.contains(&value)
}

/// Attributes recognized in a number-up rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberUpAttr {
    /// `org-savapage-landscape`: output is landscape, takes no value
    Landscape,
    PdfOrientation,
    PdfRotation,
    PdfContentRotation,
    UserRotate,
    NumberUp,
    OrientationRequested,
    NumberUpLayout,
}

impl NumberUpAttr {
    /// Case-insensitive lookup of a rule attribute name.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "org-savapage-landscape" => Some(Self::Landscape),
            "pdf-orientation" => Some(Self::PdfOrientation),
            "pdf-rotation" => Some(Self::PdfRotation),
            "pdf-content-rotation" => Some(Self::PdfContentRotation),
            "user-rotate" => Some(Self::UserRotate),
            "number-up" => Some(Self::NumberUp),
            "orientation-requested" => Some(Self::OrientationRequested),
            "number-up-layout" => Some(Self::NumberUpLayout),
            _ => None,
        }
    }
}
