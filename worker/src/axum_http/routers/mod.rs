pub mod lifecycle_jobs;
