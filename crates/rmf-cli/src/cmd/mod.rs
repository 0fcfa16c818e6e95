pub mod pick;
pub mod serve;
