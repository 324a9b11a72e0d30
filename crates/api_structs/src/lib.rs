mod email_user;
mod reminder;
mod run;
mod settings;
mod status;

pub mod dtos {
    pub use crate::email_user::dtos::*;
    pub use crate::reminder::dtos::*;
    pub use crate::settings::dtos::*;
}

pub use crate::email_user::api::*;
pub use crate::reminder::api::*;
pub use crate::run::api::*;
pub use crate::settings::api::*;
pub use crate::status::api::*;
