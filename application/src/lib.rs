pub mod ports;
#[cfg(test)]
mod testing;
