//! One `Client` method per vendor endpoint.

mod link;
mod mt_union;
mod poi;
mod quality;
