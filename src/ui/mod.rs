pub(crate) mod bills;
pub(crate) mod categories;
pub(crate) mod util;

#[cfg(test)]
#[path = "util_tests.rs"]
mod util_tests;
