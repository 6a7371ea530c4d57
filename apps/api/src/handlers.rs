pub mod catalog;
pub mod health;
pub mod items;
pub mod projects;
pub mod public;

mod uploads;

#[cfg(test)]
pub(crate) mod test_support;
