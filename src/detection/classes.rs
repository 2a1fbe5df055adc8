//! Fixed class list of the seal inspection model.
//!
//! The order matches the model's class-score columns and must not change.

/// Label reported for class ids outside the fixed list.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Class names in model output order.
pub const CLASS_NAMES: [&str; 6] = ["BLOCK", "INNER", "OK", "OUTER", "SCAR", "TEAR"];

/// Number of class-score columns per row.
pub const NUM_CLASSES: usize = CLASS_NAMES.len();

/// One of the six classes the model scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SealClass {
    Block,
    Inner,
    Ok,
    Outer,
    Scar,
    Tear,
}

impl SealClass {
    /// All classes in model output order.
    pub const ALL: [SealClass; NUM_CLASSES] = [
        SealClass::Block,
        SealClass::Inner,
        SealClass::Ok,
        SealClass::Outer,
        SealClass::Scar,
        SealClass::Tear,
    ];

    /// Looks up a class by its column index.
    pub fn from_id(class_id: usize) -> Option<Self> {
        Self::ALL.get(class_id).copied()
    }

    /// Column index of this class.
    pub fn id(self) -> usize {
        self as usize
    }

    /// Upper-case class name as emitted by the model.
    pub fn name(self) -> &'static str {
        CLASS_NAMES[self.id()]
    }
}

/// Resolves a class id to its name, or [`UNKNOWN_LABEL`] when out of range.
pub fn class_name(class_id: usize) -> &'static str {
    CLASS_NAMES.get(class_id).copied().unwrap_or(UNKNOWN_LABEL)
}
