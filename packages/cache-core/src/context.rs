/// Opaque per-request correlation id threaded through store, reconciler and
/// HSS calls purely for log correlation (named after the SAS trail id this
/// kind of system traces against). Carries no behavior of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trail(pub u64);

impl Trail {
    pub const NONE: Trail = Trail(0);
}

impl std::fmt::Display for Trail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
