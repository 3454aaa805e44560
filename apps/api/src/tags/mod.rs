// Skill/keyword canonicalisation shared by every tag-owning record.
// Tag records are only ever upserted by name; relations are replaced, never the tags.

pub mod resolver;

pub use resolver::assign_tag_set;
