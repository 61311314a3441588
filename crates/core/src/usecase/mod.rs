pub mod app_service;
pub mod job_store;
pub mod poller;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;
