use std::fmt::{Display, Formatter};

define_hazard_flags! {
    SafePathExists: safe_path_exists => false,
    SafePathStraight: safe_path_straight => false,
    UpSlope: up_slope => false,
    DownSlope: down_slope => false,
    UpStairs: up_stairs => false,
    DownStairs: down_stairs => false,
    NoSafePath: no_safe_path => true,
}

impl HazardFlags {
    /// Every flag cleared, used for raw per-frame observations.
    pub fn cleared() -> Self {
        let mut flags = Self::default();
        for flag in HazardFlag::ALL {
            flags.set(*flag, false);
        }
        flags
    }

    pub fn stairs(&self) -> bool {
        self.up_stairs || self.down_stairs
    }

    pub fn slope(&self) -> bool {
        self.up_slope || self.down_slope
    }
}

impl Display for HazardFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Display for HazardFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self.active().map(HazardFlag::name).collect::<Vec<_>>();
        write!(f, "{}", names.join(" "))
    }
}
