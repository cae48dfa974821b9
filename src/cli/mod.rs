pub mod classify;
pub mod info;
pub mod output;
pub mod replay;
pub mod rules;
