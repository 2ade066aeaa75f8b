pub mod build;
pub mod dev;
pub mod scene;
pub mod serve;
