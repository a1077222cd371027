mod acl;
mod bearer;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use bearer::{BearerAuthMiddlewareFactory, BearerAuthMiddlewareService};
