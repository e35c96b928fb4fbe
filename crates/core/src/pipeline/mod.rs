pub mod batch_executor;
pub mod batch_logger;
pub mod batch_orchestrator;
pub mod batch_result;
pub mod error_log;
pub mod frame_processor;
pub mod inference;
pub mod infrastructure;
pub mod ledger;
pub mod run_state;

#[cfg(test)]
pub(crate) mod test_support;
