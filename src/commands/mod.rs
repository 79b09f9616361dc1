pub mod interactive;
pub mod list;
pub mod split;
pub mod toc;
