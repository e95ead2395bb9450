//! # License Alerts
//!
//! Turns license expiry dates into a prioritized alert list.
//!
//! ```text
//! days_left = expiry_date - today
//!
//!   days_left < 0    → Expired            (critical)
//!   days_left ≤ 7    → ExpiringThisWeek   (critical)
//!   days_left ≤ 30   → ExpiringSoon
//!   otherwise        → no alert
//!
//! Order: expired first, then ascending days_left.
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::repository::Repository;
use crate::status::{days_until, LICENSE_EXPIRING_WINDOW_DAYS};

/// Days before expiry at which an alert becomes critical.
pub const CRITICAL_WINDOW_DAYS: i64 = 7;

/// Branch name shown when a license points at a branch that no longer exists.
pub const UNASSIGNED_BRANCH: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Expired,
    #[serde(rename = "expiring_week")]
    ExpiringThisWeek,
    ExpiringSoon,
}

impl AlertKind {
    /// Classifies a days-to-expiry value; `None` means no alert.
    pub fn classify(days_left: i64) -> Option<Self> {
        if days_left < 0 {
            Some(AlertKind::Expired)
        } else if days_left <= CRITICAL_WINDOW_DAYS {
            Some(AlertKind::ExpiringThisWeek)
        } else if days_left <= LICENSE_EXPIRING_WINDOW_DAYS {
            Some(AlertKind::ExpiringSoon)
        } else {
            None
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, AlertKind::Expired | AlertKind::ExpiringThisWeek)
    }
}

/// One license that needs attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseAlert {
    pub license_id: String,
    pub license_name: String,
    pub license_number: String,
    pub branch_id: String,
    pub branch_name: String,
    pub kind: AlertKind,
    /// Negative once expired.
    pub days_left: i64,
}

/// Builds the alert list for every license in the repository.
pub fn license_alerts(repo: &Repository, today: NaiveDate) -> Vec<LicenseAlert> {
    let mut alerts: Vec<LicenseAlert> = repo
        .licenses
        .iter()
        .filter_map(|license| {
            let days_left = days_until(license.expiry_date, today);
            let kind = AlertKind::classify(days_left)?;

            Some(LicenseAlert {
                license_id: license.id.clone(),
                license_name: license.name.clone(),
                license_number: license.license_number.clone(),
                branch_id: license.branch_id.clone(),
                branch_name: repo
                    .branch_name(&license.branch_id)
                    .unwrap_or(UNASSIGNED_BRANCH)
                    .to_string(),
                kind,
                days_left,
            })
        })
        .collect();

    alerts.sort_by_key(|alert| (alert.kind != AlertKind::Expired, alert.days_left));
    alerts
}

/// Per-kind alert counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub expired: usize,
    pub expiring_this_week: usize,
    pub expiring_soon: usize,
    pub total: usize,
    pub has_critical: bool,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[LicenseAlert]) -> Self {
        let count = |kind: AlertKind| alerts.iter().filter(|a| a.kind == kind).count();

        AlertSummary {
            expired: count(AlertKind::Expired),
            expiring_this_week: count(AlertKind::ExpiringThisWeek),
            expiring_soon: count(AlertKind::ExpiringSoon),
            total: alerts.len(),
            has_critical: alerts.iter().any(|a| a.kind.is_critical()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_repository;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(AlertKind::classify(-1), Some(AlertKind::Expired));
        assert_eq!(AlertKind::classify(0), Some(AlertKind::ExpiringThisWeek));
        assert_eq!(AlertKind::classify(7), Some(AlertKind::ExpiringThisWeek));
        assert_eq!(AlertKind::classify(8), Some(AlertKind::ExpiringSoon));
        assert_eq!(AlertKind::classify(30), Some(AlertKind::ExpiringSoon));
        assert_eq!(AlertKind::classify(31), None);
    }

    #[test]
    fn test_alert_ordering() {
        let mut repo = default_repository(Utc::now());
        let today = today();
        repo.licenses[0].expiry_date = today + Duration::days(20);
        repo.licenses[1].expiry_date = today + Duration::days(3);
        repo.licenses[2].expiry_date = today - Duration::days(5);

        let alerts = license_alerts(&repo, today);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::Expired,
                AlertKind::ExpiringThisWeek,
                AlertKind::ExpiringSoon
            ]
        );
        assert_eq!(alerts[0].days_left, -5);
    }

    #[test]
    fn test_missing_branch_falls_back() {
        let mut repo = default_repository(Utc::now());
        let today = today();
        repo.licenses.truncate(1);
        repo.licenses[0].expiry_date = today + Duration::days(1);
        repo.licenses[0].branch_id = "gone".to_string();

        let alerts = license_alerts(&repo, today);
        assert_eq!(alerts[0].branch_name, UNASSIGNED_BRANCH);
    }

    #[test]
    fn test_summary() {
        let mut repo = default_repository(Utc::now());
        let today = today();
        repo.licenses[0].expiry_date = today + Duration::days(20);
        repo.licenses[1].expiry_date = today + Duration::days(90);
        repo.licenses[2].expiry_date = today + Duration::days(25);

        let summary = AlertSummary::from_alerts(&license_alerts(&repo, today));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.expiring_soon, 2);
        assert!(!summary.has_critical);
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&AlertKind::ExpiringThisWeek).unwrap(),
            "\"expiring_week\""
        );
        assert_eq!(
            serde_json::to_string(&AlertKind::ExpiringSoon).unwrap(),
            "\"expiring_soon\""
        );
    }
}
