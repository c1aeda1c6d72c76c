//! Scanner report parsing and finding-count aggregation.
//!
//! After a scan the scanner's JSON report sits in the working area. This
//! module reads the verdict, the scanned resource, and the per-category
//! severity counts from it. Counts are clamped at zero, and a category
//! whose total is smaller than the sum of its severities is kept but
//! logged as inconsistent.

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Errors arising while loading a scanner report.
#[derive(Debug, thiserror::Error)]
pub enum ScanResultError {
    /// The report file could not be read.
    #[error("failed to read scan report {path}: {source}")]
    Read {
        /// Report location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The report is empty or whitespace.
    #[error("scan report is empty")]
    Empty,

    /// The report is not a JSON object of the expected shape.
    #[error("scan report parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The policy verdict of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanStatus {
    /// `PASSED_BY_POLICY`.
    Passed,
    /// `FAILED_BY_POLICY`.
    Failed,
    /// `IN_PROGRESS`.
    InProgress,
    /// `WARN_BY_POLICY`.
    Warned,
    /// Anything else, including a missing verdict.
    #[default]
    Unknown,
}

impl ScanStatus {
    /// Maps a report verdict to a status.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::scan_result::ScanStatus;
    ///
    /// assert_eq!(ScanStatus::from_verdict("WARN_BY_POLICY"), ScanStatus::Warned);
    /// assert_eq!(ScanStatus::from_verdict("passed"), ScanStatus::Unknown);
    /// ```
    #[must_use]
    pub fn from_verdict(verdict: &str) -> Self {
        match verdict {
            "PASSED_BY_POLICY" => Self::Passed,
            "FAILED_BY_POLICY" => Self::Failed,
            "IN_PROGRESS" => Self::InProgress,
            "WARN_BY_POLICY" => Self::Warned,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::InProgress => "InProgress",
            Self::Warned => "Warned",
            Self::Unknown => "Unknown",
        })
    }
}

/// Finding categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FindingCategory {
    /// Infrastructure-as-code misconfigurations.
    Misconfigurations,
    /// Host configuration findings.
    HostConfigurations,
    /// Package vulnerabilities.
    Vulnerabilities,
    /// Exposed secrets.
    Secrets,
    /// Malware.
    Malware,
    /// Static analysis findings.
    Sast,
}

impl FindingCategory {
    /// Every category, in report order.
    pub const ALL: [Self; 6] = [
        Self::Misconfigurations,
        Self::HostConfigurations,
        Self::Vulnerabilities,
        Self::Secrets,
        Self::Malware,
        Self::Sast,
    ];

    /// Key of the category under `result.analytics`.
    #[must_use]
    pub fn report_key(self) -> &'static str {
        match self {
            Self::Misconfigurations => "scanStatistics",
            Self::HostConfigurations => "hostConfiguration",
            Self::Vulnerabilities => "vulnerabilities",
            Self::Secrets => "secrets",
            Self::Malware => "malware",
            Self::Sast => "sast",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Misconfigurations => "Misconfigurations",
            Self::HostConfigurations => "Host Configurations",
            Self::Vulnerabilities => "Vulnerabilities",
            Self::Secrets => "Secrets",
            Self::Malware => "Malware",
            Self::Sast => "SAST",
        })
    }
}

/// Severity counts for one finding category.
///
/// Missing, null, and negative counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindingCounts {
    /// Informational findings.
    #[serde(deserialize_with = "clamped")]
    pub info_count: u64,
    /// Low-severity findings.
    #[serde(deserialize_with = "clamped")]
    pub low_count: u64,
    /// Medium-severity findings.
    #[serde(deserialize_with = "clamped")]
    pub medium_count: u64,
    /// High-severity findings.
    #[serde(deserialize_with = "clamped")]
    pub high_count: u64,
    /// Critical findings.
    #[serde(deserialize_with = "clamped")]
    pub critical_count: u64,
    /// Total findings as reported.
    #[serde(deserialize_with = "clamped")]
    pub total_count: u64,
}

impl FindingCounts {
    /// Sum of the five severity counts.
    #[must_use]
    pub fn severity_sum(&self) -> u64 {
        self.info_count
            .saturating_add(self.low_count)
            .saturating_add(self.medium_count)
            .saturating_add(self.high_count)
            .saturating_add(self.critical_count)
    }

    /// True when the total covers every severity count.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::scan_result::FindingCounts;
    ///
    /// let counts = FindingCounts { high_count: 2, total_count: 1, ..FindingCounts::default() };
    /// assert!(!counts.is_valid());
    /// ```
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.total_count >= self.severity_sum()
    }
}

/// Legacy infrastructure-as-code statistics, reported as `*Matches`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScanStatistics {
    #[serde(deserialize_with = "clamped")]
    info_matches: u64,
    #[serde(deserialize_with = "clamped")]
    low_matches: u64,
    #[serde(deserialize_with = "clamped")]
    medium_matches: u64,
    #[serde(deserialize_with = "clamped")]
    high_matches: u64,
    #[serde(deserialize_with = "clamped")]
    critical_matches: u64,
    #[serde(deserialize_with = "clamped")]
    total_matches: u64,
}

impl From<ScanStatistics> for FindingCounts {
    fn from(stats: ScanStatistics) -> Self {
        Self {
            info_count: stats.info_matches,
            low_count: stats.low_matches,
            medium_count: stats.medium_matches,
            high_count: stats.high_matches,
            critical_count: stats.critical_matches,
            total_count: stats.total_matches,
        }
    }
}

fn clamped<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.map_or(0, |count| u64::try_from(count).unwrap_or(0)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawReport {
    scan_origin_resource: Option<RawResource>,
    created_at: Option<String>,
    status: Option<RawStatus>,
    report_url: Option<String>,
    result: Option<RawResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResource {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatus {
    verdict: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawResult {
    analytics: Option<Map<String, Value>>,
    scan_statistics: Option<Value>,
}

/// A parsed scanner report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Name of the scanned resource, when reported.
    pub scanned_resource: Option<String>,
    /// Report creation time as given.
    pub scan_time: Option<String>,
    /// Policy verdict.
    pub status: ScanStatus,
    /// Link to the report in the vendor console.
    pub report_url: Option<String>,
    /// Per-category counts, or `None` when the report has no analytics.
    pub analytics: Option<BTreeMap<FindingCategory, FindingCounts>>,
}

impl ScanReport {
    /// Parses a report from JSON text.
    ///
    /// A category that fails to parse is skipped with a warning rather than
    /// failing the whole report.
    ///
    /// # Errors
    ///
    /// Returns [`ScanResultError::Empty`] for blank input and
    /// [`ScanResultError::Json`] when the text is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::scan_result::{FindingCategory, ScanReport, ScanStatus};
    ///
    /// let json = r#"{"status":{"verdict":"FAILED_BY_POLICY"},
    ///     "result":{"analytics":{"secrets":{"highCount":2,"totalCount":2}}}}"#;
    /// let report = ScanReport::from_json_str(json).expect("valid report");
    /// assert_eq!(report.status, ScanStatus::Failed);
    /// let analytics = report.analytics.expect("analytics present");
    /// assert_eq!(analytics[&FindingCategory::Secrets].high_count, 2);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ScanResultError> {
        if json.trim().is_empty() {
            return Err(ScanResultError::Empty);
        }
        let raw: RawReport = serde_json::from_str(json)?;
        let report = Self {
            scanned_resource: trimmed(raw.scan_origin_resource.and_then(|res| res.name)),
            scan_time: trimmed(raw.created_at),
            status: raw
                .status
                .and_then(|status| status.verdict)
                .map_or(ScanStatus::Unknown, |verdict| ScanStatus::from_verdict(&verdict)),
            report_url: trimmed(raw.report_url),
            analytics: raw.result.and_then(collect_analytics),
        };
        report.warn_on_inconsistencies();
        Ok(report)
    }

    /// Reads and parses the report at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanResultError::Read`] when the file cannot be read, or
    /// any error [`ScanReport::from_json_str`] reports.
    pub fn load(path: &Utf8Path) -> Result<Self, ScanResultError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScanResultError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Categories whose total is smaller than the sum of their severities.
    #[must_use]
    pub fn inconsistent_categories(&self) -> Vec<FindingCategory> {
        self.analytics
            .iter()
            .flatten()
            .filter(|(_, counts)| !counts.is_valid())
            .map(|(category, _)| *category)
            .collect()
    }

    /// One line naming the resource, the verdict, and each category total.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizcli_installer::scan_result::ScanReport;
    ///
    /// assert_eq!(
    ///     ScanReport::default().summary(),
    ///     "Scan result: Unknown; findings: none"
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let findings = match &self.analytics {
            Some(analytics) if !analytics.is_empty() => analytics
                .iter()
                .map(|(category, counts)| format!("{category}={}", counts.total_count))
                .collect::<Vec<_>>()
                .join(", "),
            _ => "none".to_owned(),
        };
        let subject = self
            .scanned_resource
            .as_ref()
            .map_or_else(|| "Scan result".to_owned(), |name| format!("Scan result for {name}"));
        format!("{subject}: {}; findings: {findings}", self.status)
    }

    fn warn_on_inconsistencies(&self) {
        for category in self.inconsistent_categories() {
            warn!(
                target: "wizcli::scan_result",
                "analytics for {category} contain inconsistencies"
            );
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn collect_analytics(result: RawResult) -> Option<BTreeMap<FindingCategory, FindingCounts>> {
    let mut analytics = result.analytics.map(|raw| {
        FindingCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let value = raw.get(category.report_key())?;
                parse_category(category, value).map(|counts| (category, counts))
            })
            .collect::<BTreeMap<_, _>>()
    });

    // Legacy IaC scans report misconfigurations outside `analytics`.
    if let Some(stats) = result.scan_statistics {
        match ScanStatistics::deserialize(stats) {
            Ok(stats) => {
                analytics
                    .get_or_insert_with(BTreeMap::new)
                    .insert(FindingCategory::Misconfigurations, stats.into());
            }
            Err(err) => {
                warn!(target: "wizcli::scan_result", "skipping scan statistics: {err}");
            }
        }
    }
    analytics
}

fn parse_category(category: FindingCategory, value: &Value) -> Option<FindingCounts> {
    if value.is_null() {
        return None;
    }
    match FindingCounts::deserialize(value) {
        Ok(counts) => Some(counts),
        Err(err) => {
            warn!(target: "wizcli::scan_result", "skipping {category} analytics: {err}");
            None
        }
    }
}

#[cfg(test)]
#[path = "scan_result_tests.rs"]
mod tests;
