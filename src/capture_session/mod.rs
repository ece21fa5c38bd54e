pub mod lifecycle;
#[cfg(test)]
mod tests;
