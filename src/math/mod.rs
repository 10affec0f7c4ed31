mod aabb;
mod ray;
mod vector;

pub use aabb::AABB;
pub use ray::{moller_trumbore_intersect, Plane, Ray, TriangleIntersection};
pub use vector::{are_close, EPSILON};
