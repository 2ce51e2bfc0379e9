use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Response body of a successful image upload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub path: String,
}
