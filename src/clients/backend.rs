use crate::error::InferenceError;
use crate::models::UploadItem;
use async_trait::async_trait;
use serde_json::Value;

/// 远程推理能力
///
/// 流程层只依赖这个 trait，测试时可以替换为模拟实现
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// 建立连接（获取服务配置），批处理开始前调用一次
    async fn connect(&self) -> Result<(), InferenceError>;

    /// 对单个文件发起推理，返回响应的第一个数据槽
    async fn predict(&self, item: &UploadItem) -> Result<Value, InferenceError>;
}

#[async_trait]
impl<T: InferenceBackend + ?Sized> InferenceBackend for std::sync::Arc<T> {
    async fn connect(&self) -> Result<(), InferenceError> {
        (**self).connect().await
    }

    async fn predict(&self, item: &UploadItem) -> Result<Value, InferenceError> {
        (**self).predict(item).await
    }
}
