pub mod backend;
pub mod pipeline;
pub mod svg;
