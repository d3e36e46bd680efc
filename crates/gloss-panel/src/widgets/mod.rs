//! Widgets for the overlay panel

pub mod input_box;
pub mod spinner;
pub mod transcript;

pub use input_box::InputBox;
pub use spinner::Spinner;
pub use transcript::Transcript;
