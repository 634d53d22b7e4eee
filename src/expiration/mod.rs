mod scheduler;

pub use scheduler::ExpirationScheduler;
