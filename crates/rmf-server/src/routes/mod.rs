pub mod form;
pub mod login;
pub mod logout;
pub mod not_maintainer;
