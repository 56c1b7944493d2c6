use crate::domain::model::Upload;
use crate::server::error::ApiError;
use axum::extract::Multipart;
use std::collections::HashMap;

/// 讀進記憶體的 multipart 表單
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    // 瀏覽器未選檔時仍會送出空的檔案欄位
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let mut upload = Upload::new(file_name, bytes);
                    upload.content_type = content_type;
                    form.files.insert(name, upload);
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name).filter(|upload| !upload.is_empty())
    }

    /// 去除前後空白；空字串視為未填
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
