mod common;
mod registry;
mod routing;
