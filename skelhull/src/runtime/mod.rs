mod animation;
mod skeleton;

pub use animation::*;
pub use skeleton::*;


#[cfg(test)]
mod animation_tests;
