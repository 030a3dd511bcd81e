//! Application Layer - Use Cases

pub mod account;
pub mod business_login;
pub mod config;
pub mod google_login;
pub mod logout;
pub mod refresh;

pub use account::WithdrawUseCase;
pub use business_login::{BusinessLoginInput, BusinessLoginOutput, BusinessLoginUseCase};
pub use google_login::{GoogleLoginInput, GoogleLoginOutput, GoogleLoginUseCase};
pub use logout::{LogoutOutput, LogoutUseCase};
pub use refresh::RefreshUseCase;
