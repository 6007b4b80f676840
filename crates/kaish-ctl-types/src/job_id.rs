use std::fmt;

/// A 1-based job index, stable while the job exists.
///
/// Indices are assigned by `JobTable::add` at the lowest unused positive
/// number and are never reused while the job they name is still present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobId(u32);

impl JobId {
    /// Constructs a job id. Panics on zero — index 0 is reserved to mean
    /// "unset" and must never be synthesized as a real job id.
    pub fn new(index: u32) -> Self {
        assert!(index > 0, "job ids are 1-based");
        Self(index)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
