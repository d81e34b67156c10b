/// Platform-specific functionality: read-only attribute clearing and
/// elevation checks.
pub mod attributes;
pub mod permissions;

pub use attributes::clear_read_only;
pub use permissions::{is_elevated, permission_hint};
