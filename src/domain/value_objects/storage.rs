use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedObjectDto {
    pub path: String,
}
