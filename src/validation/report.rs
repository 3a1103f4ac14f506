use serde::{Deserialize, Serialize};

/// Severity level for a validation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Warning,
    Info,
}

/// Category of a validation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Header,
    Mesh,
    Skeleton,
    Texture,
    Animation,
    Sound,
}

/// A single validation finding.
///
/// Fatal conditions never appear here; they abort the call as a
/// `FormatError`. Everything in a report is either a repair that was applied
/// or an advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationItem {
    /// Unique code for this validation rule (e.g. "OWNER_OUT_OF_RANGE").
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Severity level.
    pub severity: ValidationSeverity,
    /// Category of the issue.
    pub category: ValidationCategory,
    /// Whether data was modified to restore an invariant.
    pub repaired: bool,
}

/// Accumulated findings for one decode or encode pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All validation findings.
    pub items: Vec<ValidationItem>,
    /// Count of warnings.
    pub warning_count: u32,
    /// Count of info items.
    pub info_count: u32,
}

impl ValidationReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation item and update counts.
    pub fn add(&mut self, item: ValidationItem) {
        match item.severity {
            ValidationSeverity::Warning => self.warning_count += 1,
            ValidationSeverity::Info => self.info_count += 1,
        }
        self.items.push(item);
    }

    /// Shorthand for an advisory warning.
    pub fn warn(&mut self, code: &str, category: ValidationCategory, message: String) {
        self.add(ValidationItem {
            code: code.to_string(),
            message,
            severity: ValidationSeverity::Warning,
            category,
            repaired: false,
        });
    }

    /// Shorthand for a warning about a repair that was applied.
    pub fn repaired(&mut self, code: &str, category: ValidationCategory, message: String) {
        self.add(ValidationItem {
            code: code.to_string(),
            message,
            severity: ValidationSeverity::Warning,
            category,
            repaired: true,
        });
    }

    /// Shorthand for an informational note.
    pub fn info(&mut self, code: &str, category: ValidationCategory, message: String) {
        self.add(ValidationItem {
            code: code.to_string(),
            message,
            severity: ValidationSeverity::Info,
            category,
            repaired: false,
        });
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        for item in other.items {
            self.add(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The plain message list, for hosts that only show strings.
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|i| i.message.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_severity() {
        let mut report = ValidationReport::new();
        report.warn("A", ValidationCategory::Mesh, "first".into());
        report.info("B", ValidationCategory::Texture, "second".into());
        report.repaired("C", ValidationCategory::Skeleton, "third".into());
        assert_eq!(report.warning_count, 2);
        assert_eq!(report.info_count, 1);
        assert_eq!(report.items.len(), 3);
        assert!(report.items[2].repaired);
    }

    #[test]
    fn merge_preserves_counts() {
        let mut a = ValidationReport::new();
        a.warn("A", ValidationCategory::Mesh, "x".into());
        let mut b = ValidationReport::new();
        b.info("B", ValidationCategory::Sound, "y".into());
        a.merge(b);
        assert_eq!(a.warning_count, 1);
        assert_eq!(a.info_count, 1);
    }

    #[test]
    fn report_serializes_for_hosts() {
        let mut report = ValidationReport::new();
        report.warn("OWNER_OUT_OF_RANGE", ValidationCategory::Mesh, "3 owners clamped".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["items"][0]["code"], "OWNER_OUT_OF_RANGE");
        assert_eq!(json["items"][0]["severity"], "warning");
        assert_eq!(json["items"][0]["category"], "mesh");
    }
}
