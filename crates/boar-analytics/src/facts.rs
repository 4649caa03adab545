//! Pure derived-metric formulas shared by every pipeline. No I/O, no
//! randomness — these are the numbers the deterministic fallback path
//! returns when the LLM cascade bottoms out, and the same numbers fed to
//! the model as facts.

const WEEKLY_CAPACITY_HOURS: f64 = 40.0;
const STAGE_BOTTLENECK_RATIO: f64 = 0.30;
const BLOCKED_RATIO_CONCERNING: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationStatus {
    Overloaded,
    Underutilized,
    Balanced,
}

impl UtilizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UtilizationStatus::Overloaded => "overloaded",
            UtilizationStatus::Underutilized => "underutilized",
            UtilizationStatus::Balanced => "balanced",
        }
    }
}

pub fn utilization_pct(remaining_hours: f64, weekly_capacity: f64) -> f64 {
    let capacity = if weekly_capacity > 0.0 { weekly_capacity } else { WEEKLY_CAPACITY_HOURS };
    remaining_hours / capacity * 100.0
}

pub fn utilization_status(pct: f64) -> UtilizationStatus {
    if pct >= 80.0 {
        UtilizationStatus::Overloaded
    } else if pct <= 50.0 {
        UtilizationStatus::Underutilized
    } else {
        UtilizationStatus::Balanced
    }
}

/// `max(0, 100 - variance(utilizations))`. An empty slice has no spread, so
/// the score is a perfect 100.
pub fn balance_score(utilizations: &[f64]) -> f64 {
    if utilizations.is_empty() {
        return 100.0;
    }
    let mean = utilizations.iter().sum::<f64>() / utilizations.len() as f64;
    let variance = utilizations.iter().map(|u| (u - mean).powi(2)).sum::<f64>() / utilizations.len() as f64;
    (100.0 - variance).max(0.0)
}

pub fn needs_manager_alert(score: f64, overloaded_count: usize) -> bool {
    score < 50.0 || overloaded_count > 2
}

pub fn stage_is_bottleneck(task_ratio: f64, is_closed: bool) -> bool {
    !is_closed && task_ratio > STAGE_BOTTLENECK_RATIO
}

pub fn blocked_ratio_concerning(ratio: f64) -> bool {
    ratio > BLOCKED_RATIO_CONCERNING
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// `days_overdue > 7 → critical; >3 → high; >1 → medium; ≤1 → low`.
pub fn overdue_severity(days_overdue: i64) -> Severity {
    if days_overdue > 7 {
        Severity::Critical
    } else if days_overdue > 3 {
        Severity::High
    } else if days_overdue > 1 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractStatus {
    Expired,
    ExpiringSoon,
    Active,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Expired => "expired",
            ContractStatus::ExpiringSoon => "expiring_soon",
            ContractStatus::Active => "active",
        }
    }
}

/// `expired ⇔ d < today`, `expiring_soon ⇔ 0 ≤ d-today ≤ 30`, else `active`.
/// Returns the status and `days_until_expiry = d - today`.
pub fn contract_status(end_date: chrono::NaiveDate, today: chrono::NaiveDate) -> (ContractStatus, i64) {
    let days_until_expiry = (end_date - today).num_days();
    let status = if end_date < today {
        ContractStatus::Expired
    } else if days_until_expiry <= 30 {
        ContractStatus::ExpiringSoon
    } else {
        ContractStatus::Active
    };
    (status, days_until_expiry)
}

/// `compliant_or_exempted_or_NA / total_items × 100`; no items ⇒ 100.
pub fn compliance_score(satisfied: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        satisfied as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn utilization_thresholds() {
        assert_eq!(utilization_status(80.0), UtilizationStatus::Overloaded);
        assert_eq!(utilization_status(50.0), UtilizationStatus::Underutilized);
        assert_eq!(utilization_status(65.0), UtilizationStatus::Balanced);
    }

    #[test]
    fn balance_score_drops_with_variance() {
        assert_eq!(balance_score(&[]), 100.0);
        let uniform = balance_score(&[60.0, 60.0, 60.0]);
        assert_eq!(uniform, 100.0);
        let spread = balance_score(&[0.0, 100.0]);
        assert!(spread < uniform);
    }

    #[test]
    fn manager_alert_triggers_on_low_score_or_many_overloaded() {
        assert!(needs_manager_alert(40.0, 0));
        assert!(needs_manager_alert(90.0, 3));
        assert!(!needs_manager_alert(90.0, 1));
    }

    #[test]
    fn stage_bottleneck_ignores_closed_stages() {
        assert!(stage_is_bottleneck(0.5, false));
        assert!(!stage_is_bottleneck(0.5, true));
        assert!(!stage_is_bottleneck(0.2, false));
    }

    #[test]
    fn overdue_severity_bands() {
        assert_eq!(overdue_severity(8), Severity::Critical);
        assert_eq!(overdue_severity(4), Severity::High);
        assert_eq!(overdue_severity(2), Severity::Medium);
        assert_eq!(overdue_severity(1), Severity::Low);
        assert_eq!(overdue_severity(0), Severity::Low);
    }

    #[test]
    fn contract_status_bands() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let (status, days) = contract_status(today - chrono::Duration::days(1), today);
        assert_eq!(status, ContractStatus::Expired);
        assert_eq!(days, -1);

        let (status, days) = contract_status(today + chrono::Duration::days(10), today);
        assert_eq!(status, ContractStatus::ExpiringSoon);
        assert_eq!(days, 10);

        let (status, _) = contract_status(today + chrono::Duration::days(31), today);
        assert_eq!(status, ContractStatus::Active);
    }

    #[test]
    fn compliance_score_is_100_when_no_items() {
        assert_eq!(compliance_score(0, 0), 100.0);
        assert_eq!(compliance_score(3, 4), 75.0);
    }
}
