pub mod link_preview;

pub use link_preview::{MetaKey, MetaTags, PreviewResult};
