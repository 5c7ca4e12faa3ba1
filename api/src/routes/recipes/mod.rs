pub mod recipes_request;
pub mod recipes_route;
