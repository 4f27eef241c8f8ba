// Interview sessions: persistence of interviews and transcripts, and the
// controller that walks a stored session through start → respond → end.

pub mod controller;
pub mod handlers;
pub mod store;
pub mod transcript;
