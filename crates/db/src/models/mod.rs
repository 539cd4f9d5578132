pub mod company;
pub mod deal;
pub mod interaction;
pub mod lead;
pub mod task;
pub mod user;
