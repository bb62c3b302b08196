pub mod descriptor;
pub mod editor_range;

pub use descriptor::SelectionDescriptor;
pub use editor_range::EditorRange;
