pub mod desk;
pub mod pipeline;
pub mod workbench;
