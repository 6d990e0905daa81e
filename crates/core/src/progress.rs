#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub scanned: u64,
    pub discovered: u64,
    /// Total weight of the files scanned so far, in the scan's weight metric.
    pub weight: f64,
}
