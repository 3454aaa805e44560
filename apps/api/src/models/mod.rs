pub mod category;
pub mod job;
pub mod job_seeker;
pub mod organization;
pub mod tag;
pub mod user;
