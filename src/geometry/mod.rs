pub mod basis;
pub mod shape;

pub use shape::{
    BodyShape, BodySpec, FinShape, FinSpec, InvalidGeometry, NoseShape, NoseSpec, RocketSpec,
    ShapeId, ShapeModel,
};
