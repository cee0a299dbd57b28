mod common;
mod navigator;
mod routing;
