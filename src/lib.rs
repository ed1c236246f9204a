//! # NeuroScan Client
//!
//! 托管脑部扫描分类模型的客户端：上传 NIfTI 扫描，转发给远程推理服务，
//! 展示各类别概率以及可选的扫描 / 热力图体数据
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有稀缺资源（到推理服务的 HTTP 连接），只暴露能力
//! - `InferenceClient` - 唯一的连接 owner，提供 connect() / predict() 能力
//! - `InferenceBackend` - 能力抽象，测试时替换为模拟实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个结果
//! - `normalizer` - 原始响应 → `AnalysisResult`
//! - `viewer` - 体数据交接给查看器，并释放临时文件
//! - `report` - 文本渲染和 JSON 报告
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整流程
//! - `SingleFlow` - 单文件（Idle → Submitting → Succeeded / Idle）
//! - `CompareFlow` - 两个文件同时提交，互不影响
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量串行处理，超时、间隔、失败隔离
//! - `orchestrator/session` - 保证同一时间只有一个提交流程
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{InferenceBackend, InferenceClient};
pub use config::{Config, RunMode};
pub use error::{AppError, AppResult, ErrorKind, InferenceError};
pub use models::{AnalysisResult, BatchProgress, BatchReport, BatchResult, UploadItem};
pub use orchestrator::{BatchOrchestrator, Session};
pub use workflow::{CompareFlow, CompareOutcome, FlowError, FlowFailure, Side, SingleFlow};
