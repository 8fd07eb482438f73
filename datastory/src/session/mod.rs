/// Scene navigation state machine.
pub mod controller;
/// Story file + data + controller.
pub mod story_session;
