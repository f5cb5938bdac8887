//! 错误处理工具函数
//!
//! 提供错误代码、上下文信息和格式化输出。

use std::collections::HashMap;
use std::fmt;

use super::{DrugRagError, LLMError, RAGError, RetrieverError};

/// 错误代码系统
///
/// 为不同类型的错误分配稳定的数字代码，便于日志检索和分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// LLM 相关错误 (1000-1499)
    LLMError = 1000,
    LLMTimeout = 1001,

    /// Embedding 相关错误 (1500-1999)
    EmbedderError = 1500,

    /// RAG 相关错误 (4000-4999)
    RAGError = 4000,
    SynthesisError = 4001,
    RAGConfigurationError = 4002,

    /// Vector Store 相关错误 (6000-6999)
    VectorStoreError = 6000,

    /// Retriever 相关错误 (7000-7999)
    RetrieverError = 7000,
    RetrievalUnavailable = 7001,
    QueryGenerationError = 7002,
    RetrieverTimeout = 7003,
    InvalidParameter = 7004,

    /// 通用错误 (9000-9999)
    ConfigurationError = 9000,
    IOError = 9001,
    JsonError = 9002,
    UnknownError = 9999,
}

impl ErrorCode {
    /// 从 DrugRagError 获取错误代码，会检查内层错误的具体变体
    pub fn from_error(error: &DrugRagError) -> Self {
        match error {
            DrugRagError::LLMError(e) => Self::from_llm_error(e),
            DrugRagError::EmbedderError(_) => ErrorCode::EmbedderError,
            DrugRagError::VectorStoreError(_) => ErrorCode::VectorStoreError,
            DrugRagError::RetrieverError(e) => Self::from_retriever_error(e),
            DrugRagError::RAGError(e) => match e {
                RAGError::RetrieverError(inner) => Self::from_retriever_error(inner),
                RAGError::SynthesisError { .. } => ErrorCode::SynthesisError,
                RAGError::InvalidConfiguration(_) | RAGError::ConfigParseError(_) => {
                    ErrorCode::RAGConfigurationError
                }
                RAGError::IoError(_) => ErrorCode::IOError,
            },
            DrugRagError::ConfigurationError(_) => ErrorCode::ConfigurationError,
            DrugRagError::IOError(_) => ErrorCode::IOError,
            DrugRagError::JsonError(_) => ErrorCode::JsonError,
            DrugRagError::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    fn from_llm_error(error: &LLMError) -> Self {
        match error {
            LLMError::Timeout(_) => ErrorCode::LLMTimeout,
            _ => ErrorCode::LLMError,
        }
    }

    fn from_retriever_error(error: &RetrieverError) -> Self {
        match error {
            RetrieverError::RetrievalUnavailable(_) => ErrorCode::RetrievalUnavailable,
            RetrieverError::GenerationError(_) => ErrorCode::QueryGenerationError,
            RetrieverError::TimeoutError(_) => ErrorCode::RetrieverTimeout,
            RetrieverError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            RetrieverError::VectorStoreError(_) => ErrorCode::VectorStoreError,
            _ => ErrorCode::RetrieverError,
        }
    }

    /// 获取错误代码的数字值
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// 获取错误代码的描述
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::LLMError => "LLM operation failed",
            ErrorCode::LLMTimeout => "LLM request timed out",
            ErrorCode::EmbedderError => "Embedding request failed",
            ErrorCode::RAGError => "RAG operation failed",
            ErrorCode::SynthesisError => "Answer synthesis failed",
            ErrorCode::RAGConfigurationError => "RAG configuration is invalid",
            ErrorCode::VectorStoreError => "Vector store operation failed",
            ErrorCode::RetrieverError => "Retriever operation failed",
            ErrorCode::RetrievalUnavailable => "Retrieval unavailable",
            ErrorCode::QueryGenerationError => "Query generation failed",
            ErrorCode::RetrieverTimeout => "Similarity search timed out",
            ErrorCode::InvalidParameter => "Invalid parameter",
            ErrorCode::ConfigurationError => "Configuration error",
            ErrorCode::IOError => "IO operation failed",
            ErrorCode::JsonError => "JSON parsing/serialization failed",
            ErrorCode::UnknownError => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}: {}", self.as_u32(), self.description())
    }
}

/// 错误上下文信息
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// 操作名称
    pub operation: Option<String>,
    /// 模块名称
    pub module: Option<String>,
    /// 额外的上下文信息
    pub metadata: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 格式化上下文信息，元数据按键排序
    pub fn format(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref module) = self.module {
            parts.push(format!("module: {}", module));
        }

        if let Some(ref operation) = self.operation {
            parts.push(format!("operation: {}", operation));
        }

        if !self.metadata.is_empty() {
            let mut entries: Vec<_> = self.metadata.iter().collect();
            entries.sort();
            let metadata_str: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            parts.push(format!("metadata: {}", metadata_str.join(", ")));
        }

        if parts.is_empty() {
            "no context".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// 根据错误来源推断模块上下文
pub fn error_context(error: &DrugRagError) -> ErrorContext {
    let module = match error {
        DrugRagError::LLMError(_) => Some("llm"),
        DrugRagError::EmbedderError(_) => Some("embedding"),
        DrugRagError::VectorStoreError(_) => Some("vectorstore"),
        DrugRagError::RetrieverError(_) => Some("retriever"),
        DrugRagError::RAGError(_) => Some("rag"),
        _ => None,
    };

    let mut context = ErrorContext::new();
    context.module = module.map(str::to_string);
    if let DrugRagError::RAGError(RAGError::SynthesisError { documents, .. }) = error {
        context = context.with_metadata("retrieved_documents", documents.len().to_string());
    }
    context
}

/// 获取错误的完整信息，包括错误代码和上下文
///
/// ```rust,ignore
/// use drug_label_rag::error::{error_info, DrugRagError};
///
/// let error = DrugRagError::ConfigurationError("missing index".to_string());
/// println!("{}", error_info(&error));
/// ```
pub fn error_info(error: &DrugRagError) -> String {
    let code = ErrorCode::from_error(error);
    let context = error_context(error);

    format!("[{}] {} [{}]", code, error, context.format())
}
