//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和提交调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 串行处理 `Vec<UploadItem>`
//! - 单个文件超时、文件间隔
//! - 失败隔离，结果增量发布
//! - 输出批次统计
//!
//! ### `session` - 会话
//! - 持有推理后端
//! - 保证同一时间只有一个提交流程
//! - 分发到单文件 / 对比 / 批量流程
//!
//! ## 层次关系
//!
//! ```text
//! session (单文件 / 对比 / 批量)
//!     ↓
//! batch_processor (处理 Vec<UploadItem>)
//!     ↓
//! workflow (SingleFlow / CompareFlow，处理单个或两个文件)
//!     ↓
//! services (能力层：normalizer / viewer / report)
//!     ↓
//! clients (基础设施：InferenceClient)
//! ```

pub mod batch_processor;
pub mod session;

// 重新导出主要类型
pub use batch_processor::BatchOrchestrator;
pub use session::Session;
