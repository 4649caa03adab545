/// Optional Odoo modules the Gateway probes for at first authentication.
/// A service degrades gracefully (503 via `ErpModuleMissing`) for any
/// model not present in this set rather than assuming universal install.
pub const OPTIONAL_MODULES: &[&str] = &[
    "hr.employee",
    "hr.applicant",
    "hr.appraisal",
    "hr.attendance",
    "hr.leave",
    "hr.contract",
    "calendar.event",
    "project.task",
];
