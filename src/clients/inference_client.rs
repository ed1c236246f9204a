/// 推理服务客户端
///
/// 封装所有与托管推理服务相关的 HTTP 调用，并在此处完成错误分类
use crate::clients::backend::InferenceBackend;
use crate::config::Config;
use crate::error::InferenceError;
use crate::models::UploadItem;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// 推理服务客户端
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    predict_route: String,
}

impl InferenceClient {
    /// 创建新的推理客户端
    pub fn new(config: &Config) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| InferenceError::unknown(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.inference_base_url.trim_end_matches('/').to_string(),
            predict_route: config.predict_route.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接完整地址
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn predict_endpoint(&self) -> String {
        self.endpoint(&format!("run/{}", self.predict_route.trim_start_matches('/')))
    }

    /// 上传文件，返回服务端保存路径
    async fn upload(&self, item: &UploadItem, upload_name: &str) -> Result<String, InferenceError> {
        let endpoint = self.endpoint("upload");
        debug!("上传文件: {} -> {}", item.name, upload_name);

        let part = Part::bytes(item.bytes.clone())
            .file_name(upload_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| InferenceError::unknown(format!("无法构建上传请求: {}", e)))?;
        let form = Form::new().part("files", part);

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport(&endpoint, e))?;

        let body = read_json(&endpoint, response).await?;

        body.as_array()
            .and_then(|paths| paths.first())
            .and_then(|p| p.as_str())
            .map(str::to_string)
            .ok_or_else(|| InferenceError::malformed("上传响应中没有文件路径"))
    }
}

#[async_trait]
impl InferenceBackend for InferenceClient {
    async fn connect(&self) -> Result<(), InferenceError> {
        let endpoint = self.endpoint("config");
        debug!("正在连接推理服务: {}", endpoint);

        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| classify_transport(&endpoint, e))?;

        read_json(&endpoint, response).await?;
        debug!("推理服务连接成功");
        Ok(())
    }

    async fn predict(&self, item: &UploadItem) -> Result<Value, InferenceError> {
        let upload_name = item.upload_name();
        let server_path = self.upload(item, upload_name).await?;

        let endpoint = self.predict_endpoint();
        let payload = file_data_payload(&server_path, upload_name);

        debug!("调用推理路由: {}", endpoint);

        let response = self
            .http
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| classify_transport(&endpoint, e))?;

        let body = read_json(&endpoint, response).await.map_err(with_file_hint)?;
        extract_first_slot(body)
    }
}

/// 推理请求体，引用已上传的文件
fn file_data_payload(server_path: &str, upload_name: &str) -> Value {
    json!({
        "data": [{
            "path": server_path,
            "orig_name": upload_name,
            "meta": { "_type": "gradio.FileData" }
        }]
    })
}

const FILE_FORMAT_HINT: &str = "Please check that the file is a valid .nii or .nii.gz scan.";

/// 推理路由的失败状态多半是文件无法解析，补充文件格式提示
fn with_file_hint(err: InferenceError) -> InferenceError {
    match err {
        InferenceError::Unknown { message } => {
            InferenceError::unknown(format!("{}. {}", message, FILE_FORMAT_HINT))
        }
        other => other,
    }
}

/// 传输层错误分类
fn classify_transport(endpoint: &str, err: reqwest::Error) -> InferenceError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        warn!("无法到达推理服务 {}: {}", endpoint, err);
        InferenceError::unreachable(endpoint, err)
    } else if err.is_decode() || err.is_body() {
        InferenceError::malformed(format!("读取响应失败: {}", err))
    } else {
        InferenceError::unknown(err.to_string())
    }
}

/// 检查状态码并解析 JSON 响应
async fn read_json(endpoint: &str, response: Response) -> Result<Value, InferenceError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(InferenceError::EndpointNotFound {
            endpoint: endpoint.to_string(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| classify_transport(endpoint, e))?;

    if !status.is_success() {
        return Err(InferenceError::unknown(describe_failure(status, &text)));
    }

    serde_json::from_str(&text)
        .map_err(|e| InferenceError::malformed(format!("响应不是合法 JSON: {}", e)))
}

/// 非成功状态的说明，优先使用服务端给出的 error 字段
fn describe_failure(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), detail)
    }
}

/// 取出响应的第一个数据槽
pub fn extract_first_slot(body: Value) -> Result<Value, InferenceError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(mut data)) if !data.is_empty() => Ok(data.swap_remove(0)),
            Some(_) => Err(InferenceError::malformed("data 字段为空或不是数组")),
            None => Err(InferenceError::malformed("响应中缺少 data 字段")),
        },
        _ => Err(InferenceError::malformed("响应不是 JSON 对象")),
    }
}
