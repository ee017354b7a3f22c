mod controller;
mod loop_worker;

pub use controller::PollingController;
pub use loop_worker::polling_loop;
