use std::collections::HashSet;

use crate::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    /// Field holding the primary external identifier (PubMed id).
    pub primary_field: String,
    /// Field that must be present for a record to be eligible (PubMed Central id).
    pub secondary_field: String,
    /// Emit a statistics snapshot every this many eligible records; 0 disables it.
    pub report_every: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            primary_field: "PMID".to_string(),
            secondary_field: "PMC".to_string(),
            report_every: 100,
        }
    }
}

/// Running sets of identifiers seen on eligible records. Observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniquenessIndex {
    primary: HashSet<String>,
    secondary: HashSet<String>,
}

impl UniquenessIndex {
    pub fn observe(&mut self, primary: Option<&str>, secondary: &str) {
        if let Some(primary) = primary {
            self.primary.insert(primary.to_string());
        }
        self.secondary.insert(secondary.to_string());
    }

    pub fn unique_primary(&self) -> usize {
        self.primary.len()
    }

    pub fn unique_secondary(&self) -> usize {
        self.secondary.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterStats {
    pub found: u64,
    pub eligible: u64,
    pub unique_primary: usize,
    pub unique_secondary: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Skipped,
    Eligible,
    /// Eligible, and the eligible count just crossed a reporting boundary.
    EligibleWithReport(FilterStats),
}

impl Admission {
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Admission::Skipped)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    settings: FilterSettings,
    index: UniquenessIndex,
    found: u64,
    eligible: u64,
}

impl RecordFilter {
    pub fn new(settings: FilterSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Decides whether `record` may be inserted and updates the counters.
    pub fn admit(&mut self, record: &Record) -> Admission {
        self.found += 1;
        let Some(secondary) = record.present(&self.settings.secondary_field) else {
            return Admission::Skipped;
        };
        let primary = record.present(&self.settings.primary_field);
        self.index.observe(primary, secondary);
        self.eligible += 1;

        let every = self.settings.report_every;
        if every > 0 && self.eligible % every == 0 {
            Admission::EligibleWithReport(self.stats())
        } else {
            Admission::Eligible
        }
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            found: self.found,
            eligible: self.eligible,
            unique_primary: self.index.unique_primary(),
            unique_secondary: self.index.unique_secondary(),
        }
    }
}
