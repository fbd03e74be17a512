macro_rules! define_hazard_flags {
    ($($name: ident : $field: ident => $initial: expr, )*) => {
        /// Names one member of [`HazardFlags`].
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum HazardFlag {
            $(
                $name,
            )*
        }

        impl HazardFlag {
            pub const ALL: &'static [HazardFlag] = &[
                $(
                    HazardFlag::$name,
                )*
            ];

            pub fn name(self) -> &'static str {
                match self {
                    $(
                        HazardFlag::$name => stringify!($field),
                    )*
                }
            }

            /// Value a flag holds before any frame has been seen.
            pub fn initial(self) -> bool {
                match self {
                    $(
                        HazardFlag::$name => $initial,
                    )*
                }
            }
        }

        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct HazardFlags {
            $(
                pub $field: bool,
            )*
        }

        impl HazardFlags {
            pub fn get(&self, flag: HazardFlag) -> bool {
                match flag {
                    $(
                        HazardFlag::$name => self.$field,
                    )*
                }
            }

            pub fn set(&mut self, flag: HazardFlag, value: bool) {
                match flag {
                    $(
                        HazardFlag::$name => self.$field = value,
                    )*
                }
            }

            /// Flags that are currently set.
            pub fn active(&self) -> impl Iterator<Item = HazardFlag> + '_ {
                HazardFlag::ALL.iter().copied().filter(move |flag| self.get(*flag))
            }
        }

        impl Default for HazardFlags {
            fn default() -> Self {
                Self {
                    $(
                        $field: $initial,
                    )*
                }
            }
        }

        /// One hysteresis latch per member of [`HazardFlags`].
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct HazardLatches {
            $(
                pub $field: $crate::stabilize::FlagLatch,
            )*
        }

        impl HazardLatches {
            pub fn new() -> Self {
                Self {
                    $(
                        $field: $crate::stabilize::FlagLatch::new($initial),
                    )*
                }
            }

            pub fn get(&self, flag: HazardFlag) -> &$crate::stabilize::FlagLatch {
                match flag {
                    $(
                        HazardFlag::$name => &self.$field,
                    )*
                }
            }

            pub fn get_mut(&mut self, flag: HazardFlag) -> &mut $crate::stabilize::FlagLatch {
                match flag {
                    $(
                        HazardFlag::$name => &mut self.$field,
                    )*
                }
            }

            /// Latched value of every flag.
            pub fn latched(&self) -> HazardFlags {
                HazardFlags {
                    $(
                        $field: self.$field.latched(),
                    )*
                }
            }
        }

        impl Default for HazardLatches {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
