//! Node, face and self-weight loads

mod assembler;
mod face_load;
mod selfweight;

pub use assembler::LoadAssembler;
pub use face_load::FaceLoad;
pub use selfweight::SelfWeight;
