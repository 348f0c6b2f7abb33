//! Bus transaction counters

/// Counts transactions and frames seen by a bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    reads: u64,
    writes: u64,
    unknown: u64,
    frames: u64,
}

impl BusStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        BusStats {
            reads: 0,
            writes: 0,
            unknown: 0,
            frames: 0,
        }
    }

    /// Count one read
    pub fn record_read(&mut self) {
        self.reads += 1;
    }

    /// Count one write
    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    /// Count one transaction outside the port table
    pub fn record_unknown(&mut self) {
        self.unknown += 1;
    }

    /// Count one frame tick
    pub fn clock_frame(&mut self) {
        self.frames += 1;
    }

    /// Reads so far
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Writes so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Transactions to unknown addresses so far
    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    /// Frames ticked so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// All transactions so far
    pub fn transactions(&self) -> u64 {
        self.reads + self.writes
    }
}
