//! `start:stop:step` slices.

use std::fmt;

/// Slice bounds; `None` means "use the default for this direction".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SliceValue {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceValue {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        SliceValue { start, stop, step }
    }

    /// Positions selected from a sequence of length `len`, in order.
    ///
    /// Negative bounds count from the end and out-of-range bounds clamp.
    /// Returns `None` for a zero step.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn indices(&self, len: usize) -> Option<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return None;
        }
        let len = len as i64;
        let clamp = |bound: i64, low: i64, high: i64| {
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(low, high)
        };

        let mut out = Vec::new();
        if step > 0 {
            let start = self.start.map_or(0, |b| clamp(b, 0, len));
            let stop = self.stop.map_or(len, |b| clamp(b, 0, len));
            let mut i = start;
            while i < stop {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else {
                    break;
                };
                i = next;
            }
        } else {
            let start = self.start.map_or(len - 1, |b| clamp(b, -1, len - 1));
            let stop = self.stop.map_or(-1, |b| clamp(b, -1, len - 1));
            let mut i = start;
            while i > stop {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else {
                    break;
                };
                i = next;
            }
        }
        Some(out)
    }
}

impl fmt::Display for SliceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |b: Option<i64>| b.map_or_else(|| "None".to_string(), |n| n.to_string());
        write!(
            f,
            "slice({}, {}, {})",
            part(self.start),
            part(self.stop),
            part(self.step)
        )
    }
}
