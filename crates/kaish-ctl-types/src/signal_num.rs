use std::fmt;

/// A raw signal number, platform-dependent but always `> 0`.
///
/// Real-time signals (`SIGRTMIN..=SIGRTMAX`) are represented the same way;
/// `kaish-ctl-signal` is the only crate that knows the platform's `RTMIN`
/// value and translates `RTMIN+k`/`RTMAX-k` names into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalNum(i32);

impl SignalNum {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SignalNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SignalNum {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}
