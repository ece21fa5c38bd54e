pub mod impl_fake;
pub mod impl_websocket;
pub mod interface;
pub mod message;
pub mod subscribers;
#[cfg(test)]
mod tests;
