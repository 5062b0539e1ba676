// Admin area: session-backed login gate, dashboard listing and deletes.

pub mod gate;
pub mod handlers;
pub mod session;
