pub mod health;
pub mod swagger_main;
pub mod task;

#[cfg(test)]
pub mod test_util;
