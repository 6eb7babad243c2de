#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rasterfir_image as image;

#[doc(inline)]
pub use rasterfir_filter as filter;
