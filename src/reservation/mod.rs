pub mod hold;
pub mod lifecycle;

pub use hold::ReservationHold;
pub use lifecycle::ReservationLifecycle;
