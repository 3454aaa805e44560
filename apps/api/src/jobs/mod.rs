// Job postings: create/update with tag and category sync, the public landing
// feed, and applications against open postings.

pub mod applications;
pub mod catalog;
pub mod handlers;
pub mod sync;
pub mod views;
