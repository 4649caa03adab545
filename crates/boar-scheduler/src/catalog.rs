use crate::types::Schedule;

/// The fixed default schedule catalog: `(id, display name, schedule)`.
/// Handlers are bound at the call site (the composition root has the
/// `ErpGateway`/`Orchestrator`/`Notifier` instances these jobs need); this
/// module only owns the timing, which must reproduce the contract exactly.
pub fn default_schedules() -> Vec<(&'static str, &'static str, Schedule)> {
    vec![
        ("overdue_monitor", "Overdue task monitor", Schedule::Interval { seconds: 15 * 60 }),
        ("expiry_monitor", "Contract expiry monitor", Schedule::Daily { hour: 7, minute: 0 }),
        ("delivery_monitor", "Delivery monitor", Schedule::Interval { seconds: 6 * 60 * 60 }),
        ("compliance_checker", "Compliance checker", Schedule::Weekly { weekday: 0, hour: 8, minute: 0 }),
        ("workload_balance", "Workload balance", Schedule::Interval { seconds: 60 * 60 }),
        ("daily_report", "Daily report", Schedule::Daily { hour: 6, minute: 0 }),
        ("weekly_report", "Weekly report", Schedule::Weekly { weekday: 0, hour: 7, minute: 0 }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_seven_entries_with_unique_ids() {
        let catalog = default_schedules();
        assert_eq!(catalog.len(), 7);
        let mut ids: Vec<&str> = catalog.iter().map(|(id, _, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }
}
