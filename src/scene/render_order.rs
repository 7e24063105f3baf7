use std::cmp::Ordering;
use std::fmt;

/// Explicit draw ordering key.
///
/// Render queues are drawn in ascending order of this key. `major` dominates,
/// `minor` breaks ties. Both halves are packed into one `u32` so comparisons
/// are a single integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderOrder {
    pub major: u16,
    pub minor: u16,
}

impl RenderOrder {
    pub const DEFAULT: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Packed key: `major` in the high half, `minor` in the low half.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        ((self.major as u32) << 16) | self.minor as u32
    }

    #[inline]
    #[must_use]
    pub const fn from_value(value: u32) -> Self {
        Self {
            major: (value >> 16) as u16,
            minor: (value & 0xFFFF) as u16,
        }
    }
}

impl Ord for RenderOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl PartialOrd for RenderOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(u16, u16)> for RenderOrder {
    fn from((major, minor): (u16, u16)) -> Self {
        Self::new(major, minor)
    }
}

impl fmt::Display for RenderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
