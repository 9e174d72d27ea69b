pub mod deadline;
pub mod filter;
pub mod task_ops;
