use serde::{Deserialize, Serialize};

pub mod trigger_run {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// False when a run was already in progress
        pub accepted: bool,
        pub message: String,
    }
}
