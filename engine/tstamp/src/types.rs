pub type Serial = u32;
pub type RawClock = u64;
pub type TimeUs = f64;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Source {
    Head = 0,
    Tail = 1,
}

impl Source {
    /// Get the opposite stream
    pub fn opposite(&self) -> Source {
        match self {
            Source::Head => Source::Tail,
            Source::Tail => Source::Head,
        }
    }
}
