pub mod animation;
pub mod blend;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame;
pub mod integrator;
pub mod particles;
pub mod presence;
pub mod render;

pub use animation::*;
pub use blend::*;
pub use color::*;
pub use config::*;
pub use constants::*;
pub use engine::*;
pub use error::*;
pub use frame::*;
pub use integrator::*;
pub use particles::*;
pub use presence::*;
pub use render::*;
