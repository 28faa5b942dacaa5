use crate::utils::error::Result;

/// A place CSV documents live in. A document is addressed by a directory
/// `uri` plus a flat `file_name`.
pub trait Storage: Send + Sync {
    /// 回傳文件的顯示路徑，不存取檔案系統
    fn locate(&self, uri: &str, file_name: &str) -> Result<String>;

    /// `None` when the document does not exist yet.
    fn file_size(
        &self,
        uri: &str,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<u64>>> + Send;

    fn read_file(
        &self,
        uri: &str,
        file_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// 不存在時建立文件，然後附加資料
    fn append_file(
        &self,
        uri: &str,
        file_name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
