//! Small fixed-size linear algebra types used by the pipeline.

pub mod mat4;
pub mod vec3;
pub mod vec4;
