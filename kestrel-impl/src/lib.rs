//! Scene graph, partitioner, render-queue builder/visitor, compositor,
//! idle task queue, and asset manager that tie the Kestrel engine core
//! together (spec §4.2-§4.8, §5).

pub mod buffer;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod idle;
pub mod render;
pub mod resource;
pub mod scene;
pub mod spatial;
