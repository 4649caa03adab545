//! Assembles the Agent Surface's tool roster from `boar_llm::tools`, bound
//! to the live `ErpGateway` and identity linker for this process.

use std::sync::Arc;

use boar_erp::ErpGateway;
use boar_llm::tools::link_identity::IdentityLinker;
use boar_llm::tools::{
    get_attendance_record::GetAttendanceRecord, get_company_policy::GetCompanyPolicy,
    get_employee_info::GetEmployeeInfo, get_leave_balance::GetLeaveBalance,
    get_payroll_summary::GetPayrollSummary, link_identity::LinkIdentity,
    list_my_tasks::ListMyTasks, request_leave::RequestLeave, unlink_identity::UnlinkIdentity, Tool,
};

pub fn build_tools(erp: Arc<ErpGateway>, linker: Arc<dyn IdentityLinker>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetEmployeeInfo::new(erp.clone())),
        Box::new(GetLeaveBalance::new(erp.clone())),
        Box::new(RequestLeave::new(erp.clone())),
        Box::new(GetPayrollSummary::new(erp.clone())),
        Box::new(GetAttendanceRecord::new(erp.clone())),
        Box::new(ListMyTasks::new(erp.clone())),
        Box::new(GetCompanyPolicy::new(erp)),
        Box::new(LinkIdentity::new(linker.clone())),
        Box::new(UnlinkIdentity::new(linker)),
    ]
}
