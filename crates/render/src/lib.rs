#![warn(missing_docs)]
//! Debug line geometry for positional audio sources.

mod cone_helper;
mod line;

pub use cone_helper::{
    build_cone, cone_vertex_count, ConeHelper, MATERIAL_INNER, MATERIAL_OUTER,
};
pub use line::{DrawGroup, LineGeometry, LineMaterial, LineVertex};
