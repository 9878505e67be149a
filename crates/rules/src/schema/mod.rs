//! SVDS document shapes.
//!
//! Defines the typed view over parsed JSON content:
//! - `RawRecord`: a single mapping or a list of mappings, decided once at load time
//! - `ClassDescriptor`: the `(Family, Class)` pair a record is filed under
//! - `DescriptionKind`: the special Origin/Study provenance documents

mod descriptor;
mod record;

pub use descriptor::*;
pub use record::*;


/// Field holding the tag group (and `Tag.Class`).
pub const TAG: &str = "Tag";
/// Field inside `Tag` holding `"Family::Class"`.
pub const CLASS: &str = "Class";
pub const REQUIRED: &str = "Required";
pub const OPTIONAL: &str = "Optional";
/// Separator between family and class in `Tag.Class`.
pub const CLASS_SEPARATOR: &str = "::";
/// Family name under which Origin and Study documents are filed.
pub const DESCRIPTION_FAMILY: &str = "Description";
