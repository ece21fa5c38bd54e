pub mod impl_fake;
pub mod impl_still_images;
pub mod interface;
