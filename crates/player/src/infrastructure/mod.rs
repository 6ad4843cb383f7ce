pub mod platform;

#[cfg(target_arch = "wasm32")]
pub mod youtube;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
