pub mod brownian;
pub mod model;
pub mod trajectory;
pub mod walk;

pub use brownian::ArithmeticBrownian;
pub use model::{DiscreteProcess, ProcessModel};
pub use trajectory::Trajectory;
pub use walk::{BernoulliWalk, DiscreteWalk, SignedWalk};
