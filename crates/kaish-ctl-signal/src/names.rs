//! Signal name parsing and listing.
//!
//! Accepts names with or without the `SIG` prefix, decimal numbers, `EXIT`
//! (signal 0, the pseudo-signal used by `trap`), and — on platforms with
//! real-time signals — `RTMIN`, `RTMAX`, `RTMIN+k`, `RTMAX-k`.

use crate::SignalNum;

/// `(bare name without "SIG", signal number)`, in the conventional order
/// `kill -l` prints them.
const NAMED_SIGNALS: &[(&str, i32)] = &[
    ("HUP", 1),
    ("INT", 2),
    ("QUIT", 3),
    ("ILL", 4),
    ("TRAP", 5),
    ("ABRT", 6),
    ("BUS", 7),
    ("FPE", 8),
    ("KILL", 9),
    ("USR1", 10),
    ("SEGV", 11),
    ("USR2", 12),
    ("PIPE", 13),
    ("ALRM", 14),
    ("TERM", 15),
    ("STKFLT", 16),
    ("CHLD", 17),
    ("CONT", 18),
    ("STOP", 19),
    ("TSTP", 20),
    ("TTIN", 21),
    ("TTOU", 22),
    ("URG", 23),
    ("XCPU", 24),
    ("XFSZ", 25),
    ("VTALRM", 26),
    ("PROF", 27),
    ("WINCH", 28),
    ("IO", 29),
    ("PWR", 30),
    ("SYS", 31),
];

/// Returns the platform's real-time signal range, if any.
#[cfg(target_os = "linux")]
fn rt_range() -> Option<(i32, i32)> {
    // SAFETY: SIGRTMIN/SIGRTMAX take no arguments and have no preconditions;
    // they just read libc-internal constants.
    #[allow(unsafe_code)]
    let (min, max) = unsafe { (libc::SIGRTMIN(), libc::SIGRTMAX()) };
    if min <= max { Some((min, max)) } else { None }
}

#[cfg(not(target_os = "linux"))]
fn rt_range() -> Option<(i32, i32)> {
    None
}

/// Parses a signal name or number into a `SignalNum`. `EXIT` and `0` both
/// yield signal number 0, the pseudo-signal `trap` uses for shell exit.
pub fn parse_name(name: &str) -> Option<SignalNum> {
    let upper = name.to_ascii_uppercase();

    if upper.chars().all(|c| c.is_ascii_digit()) && !upper.is_empty() {
        let n: i32 = upper.parse().ok()?;
        if n == 0 || NAMED_SIGNALS.iter().any(|(_, no)| *no == n) {
            return Some(SignalNum::new(n));
        }
        if let Some((min, max)) = rt_range() {
            if (min..=max).contains(&n) {
                return Some(SignalNum::new(n));
            }
        }
        return None;
    }

    if upper == "EXIT" {
        return Some(SignalNum::new(0));
    }

    let bare = upper.strip_prefix("SIG").unwrap_or(&upper);

    if let Some((_, no)) = NAMED_SIGNALS.iter().find(|(n, _)| *n == bare) {
        return Some(SignalNum::new(*no));
    }

    if let Some((min, max)) = rt_range() {
        if bare == "RTMIN" {
            return Some(SignalNum::new(min));
        }
        if bare == "RTMAX" {
            return Some(SignalNum::new(max));
        }
        if let Some(rest) = bare.strip_prefix("RTMIN+") {
            let k: i32 = rest.parse().ok()?;
            if k >= 0 && min + k <= max {
                return Some(SignalNum::new(min + k));
            }
        }
        if let Some(rest) = bare.strip_prefix("RTMAX-") {
            let k: i32 = rest.parse().ok()?;
            if k >= 0 && max - k >= min {
                return Some(SignalNum::new(max - k));
            }
        }
    }

    None
}

/// Returns the bare name (no `SIG` prefix) for a signal number, or `None`
/// for an unrecognized number.
pub fn name_of(sig: SignalNum) -> Option<String> {
    let n = sig.get();
    if n == 0 {
        return Some("EXIT".to_string());
    }
    if let Some((name, _)) = NAMED_SIGNALS.iter().find(|(_, no)| *no == n) {
        return Some((*name).to_string());
    }
    if let Some((min, max)) = rt_range() {
        if (min..=max).contains(&n) {
            if n == min {
                return Some("RTMIN".to_string());
            }
            if n == max {
                return Some("RTMAX".to_string());
            }
            let range = max - min;
            let diff = n - min;
            return Some(if diff <= range / 2 {
                format!("RTMIN+{diff}")
            } else {
                format!("RTMAX-{}", max - n)
            });
        }
    }
    None
}

/// All known signal names in `kill -l` order, for the bare `kill -l`
/// listing.
pub fn list_all() -> Vec<(String, SignalNum)> {
    NAMED_SIGNALS
        .iter()
        .map(|(name, no)| ((*name).to_string(), SignalNum::new(*no)))
        .collect()
}

/// A verbose one-line description for `kill -v`.
pub fn describe(sig: SignalNum) -> String {
    match name_of(sig) {
        Some(name) => format!("{}: SIG{} ({})", sig.get(), name, sig.get()),
        None => format!("{}: unknown signal", sig.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_sig_prefix() {
        assert_eq!(parse_name("INT"), Some(SignalNum::new(2)));
        assert_eq!(parse_name("SIGINT"), Some(SignalNum::new(2)));
        assert_eq!(parse_name("sigint"), Some(SignalNum::new(2)));
    }

    #[test]
    fn parses_numeric_and_exit() {
        assert_eq!(parse_name("9"), Some(SignalNum::new(9)));
        assert_eq!(parse_name("EXIT"), Some(SignalNum::new(0)));
        assert_eq!(parse_name("0"), Some(SignalNum::new(0)));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(parse_name("NOTASIGNAL"), None);
    }

    #[test]
    fn name_of_round_trips() {
        for (name, no) in NAMED_SIGNALS {
            let sig = SignalNum::new(*no);
            assert_eq!(name_of(sig), Some((*name).to_string()));
            assert_eq!(parse_name(name), Some(sig));
        }
    }
}
