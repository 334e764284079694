pub mod classify;
pub mod console;
pub mod dispatch;
pub mod run;
pub mod targets;

pub use dispatch::dispatch;
