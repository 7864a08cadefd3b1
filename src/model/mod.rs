pub mod benefit;
pub mod employee;
pub mod import;
pub mod payroll;
pub mod template;
