mod controller;
mod narrator;
mod session;

pub use controller::NarrationController;
pub use narrator::{Narrator, NarratorError, UtteranceId};
pub use session::NarrationSession;
