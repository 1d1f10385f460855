//! A single package line contributed by one upstream source.

/// One rendered package-name line plus the GTIN it was keyed on and the
/// source that contributed it — used by the merger to de-duplicate and by
/// the beautifier to re-order `packInfo`/`packages` together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub gtin: String,
    pub source: PackageSource,
    /// The full rendered line, e.g. `"Dafalgan 500mg Tabl 20 Stk|||CHF 4.50|..."`.
    pub line: String,
    /// The fixed-layout segment bound to the `packages` output column.
    pub packages_segment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PackageSource {
    Refdata,
    Swissmedic,
    Bag,
}
