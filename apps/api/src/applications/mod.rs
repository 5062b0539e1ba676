// Public application intake: validation, resume placement, and the
// submission service that ties them to the store.

pub mod handlers;
pub mod placement;
pub mod service;
pub mod validation;
