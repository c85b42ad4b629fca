pub mod dispatch;
pub mod migrate;
pub mod program;
pub mod serve;
pub mod shared;
