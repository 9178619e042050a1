pub mod util;

pub mod engine;
pub mod geom;
pub mod input;
pub mod render;

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
pub mod web;

pub use engine::{NodeId, NodeRef, PointChain, Stroke};
pub use geom::Point;
pub use input::{ControllerConfig, PaintController};

#[cfg(test)]
pub mod test;
