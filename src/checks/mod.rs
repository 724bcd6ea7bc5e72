pub mod harness;
pub mod validator;
