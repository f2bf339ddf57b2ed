pub mod format5;
pub mod format80;
#[cfg(test)]
pub(crate) mod writer;

pub use format5::{Format5, PackCodec, VARIANT_FORMAT80, VARIANT_LZO};
