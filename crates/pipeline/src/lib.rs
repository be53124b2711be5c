mod domains;
mod utils;

#[cfg(test)]
mod test_utils;

pub use domains::*;
pub use utils::*;
